//! One request/reply round trip over a blocking stream.

use std::borrow::Cow;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicU32, Ordering};

use buffer::DynamicBuffer;
use tracing::debug;

use crate::error::{DecodeError, EncodeError, ExchangeResult};
use crate::header::{MessageHeader, HEADER_SIZE};
use crate::kind::{ReplyStatus, RequestKind};
use crate::limits::Limits;

/// Bytes after the header that every reply carries (the status byte).
const REPLY_FIXED_LEN: u32 = 1;

/// Process-wide sequence counter, shared by every connection.
static NEXT_SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Allocates the next sequence number.
///
/// Numbers are unique across threads until the counter wraps at `u32::MAX`.
pub fn next_sequence() -> u32 {
    NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// A validated reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Sequence number, equal to the request's.
    pub sequence: u32,
    /// Server verdict.
    pub status: ReplyStatus,
    /// Bytes following the status byte.
    pub payload: Vec<u8>,
}

impl Reply {
    /// Returns `true` for an OK reply.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == ReplyStatus::Ok
    }

    /// Returns `true` for a FAIL reply.
    #[must_use]
    pub fn is_fail(&self) -> bool {
        self.status == ReplyStatus::Fail
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Returns the payload as text, replacing invalid UTF-8.
    ///
    /// FAIL replies carry a human-readable message.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Returns `true` if this is a FAIL reply whose message is exactly `marker`.
    #[must_use]
    pub fn is_fail_with(&self, marker: &str) -> bool {
        self.is_fail() && self.payload == marker.as_bytes()
    }

    /// Moves the payload into a buffer for field-by-field decoding.
    #[must_use]
    pub fn into_buffer(self) -> DynamicBuffer {
        DynamicBuffer::from_vec(self.payload)
    }
}

/// Sends one request and reads its reply, using default [`Limits`].
pub fn request<S>(stream: &mut S, kind: RequestKind, payload: &[u8]) -> ExchangeResult<Reply>
where
    S: Read + Write + ?Sized,
{
    request_with_limits(stream, kind, payload, &Limits::default())
}

/// Sends one request and reads its reply.
///
/// The request goes out as a single contiguous frame. The reply header is
/// validated (sequence, declared length against `limits`, minimum length,
/// status byte) before any payload byte is read. Any failure aborts the
/// exchange; the stream should then be treated as unusable.
pub fn request_with_limits<S>(
    stream: &mut S,
    kind: RequestKind,
    payload: &[u8],
    limits: &Limits,
) -> ExchangeResult<Reply>
where
    S: Read + Write + ?Sized,
{
    let sequence = next_sequence();
    let frame = encode_request(sequence, kind, payload)?;
    stream.write_all(&frame)?;
    stream.flush()?;

    let mut fixed = [0u8; HEADER_SIZE + 1];
    stream.read_exact(&mut fixed)?;
    let (header, status) = validate_reply_header(sequence, &fixed, limits)?;

    let data_len = usize::try_from(header.length - REPLY_FIXED_LEN).map_err(|_| {
        DecodeError::LengthExceeded {
            limit: limits.max_message_len,
            actual: usize::MAX,
        }
    })?;
    let mut data = vec![0u8; data_len];
    stream.read_exact(&mut data)?;

    debug!(
        kind = kind.name(),
        seq = sequence,
        request_len = payload.len(),
        reply_len = data_len,
        fail = status == ReplyStatus::Fail,
        "exchange complete"
    );

    Ok(Reply {
        sequence,
        status,
        payload: data,
    })
}

/// Builds a request frame: header, kind byte, payload.
pub fn encode_request(
    sequence: u32,
    kind: RequestKind,
    payload: &[u8],
) -> Result<Vec<u8>, EncodeError> {
    let body_len = payload
        .len()
        .checked_add(1)
        .ok_or(EncodeError::LengthOverflow {
            length: payload.len(),
        })?;
    let length = u32::try_from(body_len).map_err(|_| EncodeError::LengthOverflow {
        length: body_len,
    })?;

    let mut buf = DynamicBuffer::with_capacity(HEADER_SIZE + body_len);
    MessageHeader::new(sequence, length).encode(&mut buf)?;
    buf.write_u8(kind.as_u8())?;
    buf.write_data(payload)?;
    Ok(buf.into_vec())
}

/// Validates the header and status byte of a reply, in protocol order.
pub fn validate_reply_header(
    expected_sequence: u32,
    fixed: &[u8; HEADER_SIZE + 1],
    limits: &Limits,
) -> Result<(MessageHeader, ReplyStatus), DecodeError> {
    let [s0, s1, s2, s3, l0, l1, l2, l3, status] = *fixed;
    let header = MessageHeader::from_bytes([s0, s1, s2, s3, l0, l1, l2, l3]);

    if header.sequence != expected_sequence {
        return Err(DecodeError::SequenceMismatch {
            expected: expected_sequence,
            found: header.sequence,
        });
    }

    let declared = usize::try_from(header.length).unwrap_or(usize::MAX);
    if declared > limits.max_message_len {
        return Err(DecodeError::LengthExceeded {
            limit: limits.max_message_len,
            actual: declared,
        });
    }

    if header.length < REPLY_FIXED_LEN {
        return Err(DecodeError::LengthTooSmall {
            declared: header.length,
            required: REPLY_FIXED_LEN,
        });
    }

    let status = ReplyStatus::parse(status)?;
    Ok((header, status))
}
