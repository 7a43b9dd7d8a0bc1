//! Error types for wire format operations.

use std::{fmt, io};

use buffer::BufError;

/// Result type for decoding operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// Result type for a full request/reply exchange.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Errors raised while interpreting bytes received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Reply sequence number does not match the request.
    SequenceMismatch { expected: u32, found: u32 },

    /// Declared reply length exceeds the configured maximum.
    LengthExceeded { limit: usize, actual: usize },

    /// Declared reply length cannot hold the fixed reply fields.
    LengthTooSmall { declared: u32, required: u32 },

    /// Status byte is neither OK nor FAIL.
    InvalidStatus { status: u8 },

    /// Request kind byte is not a known kind.
    UnknownKind { kind: u8 },

    /// A field ran past the end of the payload.
    Buffer(BufError),

    /// A string field is not valid UTF-8.
    InvalidUtf8 { valid_up_to: usize },

    /// A fixed-size value arrived with the wrong number of bytes.
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The underlying buffer rejected the write.
    Buffer(BufError),

    /// A field or frame is too long for its `u32` length prefix.
    LengthOverflow { length: usize },
}

/// Errors that abort a request/reply exchange.
#[derive(Debug)]
pub enum ExchangeError {
    /// The transport failed while sending or receiving.
    Io(io::Error),

    /// The request could not be framed.
    Encode(EncodeError),

    /// The reply failed validation.
    Decode(DecodeError),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SequenceMismatch { expected, found } => {
                write!(
                    f,
                    "wrong sequence number: expected {expected}, found {found}"
                )
            }
            Self::LengthExceeded { limit, actual } => {
                write!(f, "message too large: {actual} > {limit}")
            }
            Self::LengthTooSmall { declared, required } => {
                write!(
                    f,
                    "invalid reply length: {declared} bytes, need at least {required}"
                )
            }
            Self::InvalidStatus { status } => {
                write!(f, "invalid status: 0x{status:02X}")
            }
            Self::UnknownKind { kind } => write!(f, "unknown request kind: 0x{kind:02X}"),
            Self::Buffer(err) => write!(f, "malformed field: {err}"),
            Self::InvalidUtf8 { valid_up_to } => {
                write!(f, "string field is not UTF-8 after byte {valid_up_to}")
            }
            Self::SizeMismatch {
                what,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "invalid {what} size: expected {expected} bytes, got {actual}"
                )
            }
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffer(err) => write!(f, "encode failed: {err}"),
            Self::LengthOverflow { length } => {
                write!(f, "length overflow: {length}")
            }
        }
    }
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "transport error: {err}"),
            Self::Encode(err) => write!(f, "request encoding error: {err}"),
            Self::Decode(err) => write!(f, "reply decoding error: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Buffer(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Buffer(err) => Some(err),
            Self::LengthOverflow { .. } => None,
        }
    }
}

impl std::error::Error for ExchangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Decode(err) => Some(err),
        }
    }
}

impl From<BufError> for DecodeError {
    fn from(err: BufError) -> Self {
        Self::Buffer(err)
    }
}

impl From<BufError> for EncodeError {
    fn from(err: BufError) -> Self {
        Self::Buffer(err)
    }
}

impl From<io::Error> for ExchangeError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<EncodeError> for ExchangeError {
    fn from(err: EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl From<DecodeError> for ExchangeError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}
