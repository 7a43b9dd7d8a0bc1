//! Message header layout.

use buffer::{BufResult, DynBuf, Storage};

/// Header size in bytes (sequence + length).
pub const HEADER_SIZE: usize = 4 + 4;

/// Header shared by requests and replies.
///
/// `length` counts the bytes that follow the header: the kind or status byte
/// plus the payload. Both fields are little-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MessageHeader {
    /// Sequence number linking a reply to its request.
    pub sequence: u32,
    /// Number of bytes following the header.
    pub length: u32,
}

impl MessageHeader {
    /// Creates a header.
    #[must_use]
    pub const fn new(sequence: u32, length: u32) -> Self {
        Self { sequence, length }
    }

    /// Returns the on-wire bytes.
    #[must_use]
    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..4].copy_from_slice(&self.sequence.to_le_bytes());
        out[4..].copy_from_slice(&self.length.to_le_bytes());
        out
    }

    /// Parses the on-wire bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; HEADER_SIZE]) -> Self {
        let [s0, s1, s2, s3, l0, l1, l2, l3] = bytes;
        Self {
            sequence: u32::from_le_bytes([s0, s1, s2, s3]),
            length: u32::from_le_bytes([l0, l1, l2, l3]),
        }
    }

    /// Writes the header at the buffer cursor.
    pub fn encode<S: Storage>(&self, buf: &mut DynBuf<S>) -> BufResult<()> {
        buf.write_u32(self.sequence)?;
        buf.write_u32(self.length)
    }

    /// Reads a header at the buffer cursor.
    pub fn decode<S: Storage>(buf: &mut DynBuf<S>) -> BufResult<Self> {
        let sequence = buf.read_u32()?;
        let length = buf.read_u32()?;
        Ok(Self { sequence, length })
    }
}
