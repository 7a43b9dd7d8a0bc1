//! Bounds applied to incoming replies.

/// Largest reply length the server is allowed to declare, in bytes.
///
/// Counts everything after the header: the status byte plus the payload.
pub const MAX_MESSAGE_LEN: usize = 8192;

/// Reply decoding bounds.
///
/// Checked against the declared length before any payload byte is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum declared reply length in bytes.
    pub max_message_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_message_len: MAX_MESSAGE_LEN,
        }
    }
}

impl Limits {
    /// A 512-byte cap, small enough for tests to cross cheaply.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_message_len: 512,
        }
    }

    /// No cap beyond `usize`.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_message_len: usize::MAX,
        }
    }
}
