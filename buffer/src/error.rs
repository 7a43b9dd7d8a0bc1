//! Error types for buffer operations.

use std::fmt;

/// Result type for buffer operations.
pub type BufResult<T> = Result<T, BufError>;

/// Errors that can occur while reading from or writing to a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufError {
    /// Attempted to read past the logical end of the buffer.
    EndOfBuffer {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available after the cursor.
        available: usize,
    },

    /// A write needs more room but the storage is borrowed and cannot grow.
    NotOwned {
        /// Capacity required to complete the write.
        required: usize,
        /// Capacity of the borrowed storage.
        capacity: usize,
    },

    /// Offset arithmetic overflowed `usize`.
    SizeOverflow {
        /// Cursor position at the time of the request.
        offset: usize,
        /// Number of bytes requested.
        requested: usize,
    },

    /// The allocator refused to grow the storage.
    AllocationFailed {
        /// Capacity that was requested.
        capacity: usize,
    },
}

impl fmt::Display for BufError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfBuffer {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::NotOwned { required, capacity } => {
                write!(
                    f,
                    "borrowed buffer of {capacity} bytes cannot grow to {required} bytes"
                )
            }
            Self::SizeOverflow { offset, requested } => {
                write!(
                    f,
                    "size overflow: {requested} bytes requested at offset {offset}"
                )
            }
            Self::AllocationFailed { capacity } => {
                write!(f, "failed to allocate {capacity} bytes")
            }
        }
    }
}

impl std::error::Error for BufError {}
