//! Fixed-layout protocol values.
//!
//! Tokens and receipts travel as raw bytes (no length prefix) and are signed by
//! the server; the client treats the signature as opaque.

use buffer::{BorrowedBuffer, BufResult, DynBuf, Storage};

use crate::error::{DecodeError, WireResult};
use crate::field;

/// Size of a server signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// An opaque server signature.
pub type Signature = [u8; SIGNATURE_SIZE];

/// Authentication token issued by the server on login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthToken {
    /// Id of the logged-in user.
    pub user_id: u64,
    /// Opaque server signature.
    pub signature: Signature,
}

impl AuthToken {
    /// Size on the wire in bytes.
    pub const WIRE_SIZE: usize = 8 + SIGNATURE_SIZE;

    /// Returns the on-wire bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; AuthToken::WIRE_SIZE] {
        let mut out = [0u8; AuthToken::WIRE_SIZE];
        out[..8].copy_from_slice(&self.user_id.to_le_bytes());
        out[8..].copy_from_slice(&self.signature);
        out
    }

    /// Decodes a token from exactly [`WIRE_SIZE`](Self::WIRE_SIZE) bytes.
    pub fn decode(bytes: &[u8]) -> WireResult<Self> {
        let mut raw = exact::<{ AuthToken::WIRE_SIZE }>("auth token", bytes)?;
        Ok(Self::read_from(&mut BorrowedBuffer::filled(&mut raw))?)
    }

    /// Writes the token at the buffer cursor.
    pub fn write_to<S: Storage>(&self, buf: &mut DynBuf<S>) -> BufResult<()> {
        buf.write_data(&self.encode())
    }

    /// Reads a token at the buffer cursor.
    pub fn read_from<S: Storage>(buf: &mut DynBuf<S>) -> BufResult<Self> {
        let user_id = buf.read_u64()?;
        let signature = buf.read_array()?;
        Ok(Self { user_id, signature })
    }
}

/// Proof of a transfer, presented by the recipient to claim the funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferReceipt {
    /// Amount transferred.
    pub amount: u64,
    /// Id of the transferred currency.
    pub currency: u64,
    /// User id allowed to claim the funds.
    pub recipient: u64,
    /// Opaque server signature.
    pub signature: Signature,
}

impl TransferReceipt {
    /// Size on the wire in bytes.
    pub const WIRE_SIZE: usize = 8 * 3 + SIGNATURE_SIZE;

    /// Returns the on-wire bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; TransferReceipt::WIRE_SIZE] {
        let mut out = [0u8; TransferReceipt::WIRE_SIZE];
        out[..8].copy_from_slice(&self.amount.to_le_bytes());
        out[8..16].copy_from_slice(&self.currency.to_le_bytes());
        out[16..24].copy_from_slice(&self.recipient.to_le_bytes());
        out[24..].copy_from_slice(&self.signature);
        out
    }

    /// Decodes a receipt from exactly [`WIRE_SIZE`](Self::WIRE_SIZE) bytes.
    pub fn decode(bytes: &[u8]) -> WireResult<Self> {
        let mut raw = exact::<{ TransferReceipt::WIRE_SIZE }>("transfer receipt", bytes)?;
        Ok(Self::read_from(&mut BorrowedBuffer::filled(&mut raw))?)
    }

    /// Writes the receipt at the buffer cursor.
    pub fn write_to<S: Storage>(&self, buf: &mut DynBuf<S>) -> BufResult<()> {
        buf.write_data(&self.encode())
    }

    /// Reads a receipt at the buffer cursor.
    pub fn read_from<S: Storage>(buf: &mut DynBuf<S>) -> BufResult<Self> {
        let amount = buf.read_u64()?;
        let currency = buf.read_u64()?;
        let recipient = buf.read_u64()?;
        let signature = buf.read_array()?;
        Ok(Self {
            amount,
            currency,
            recipient,
            signature,
        })
    }
}

/// A chat message pulled from the server queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// User id of the sender.
    pub sender: u64,
    /// Send time reported by the server.
    pub timestamp: u64,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Decodes a message: sender, timestamp, then a string field.
    pub fn decode<S: Storage>(buf: &mut DynBuf<S>) -> WireResult<Self> {
        let sender = buf.read_u64()?;
        let timestamp = buf.read_u64()?;
        let content = field::read_string(buf)?.to_owned();
        Ok(Self {
            sender,
            timestamp,
            content,
        })
    }
}

/// Decodes a little-endian `u64` from exactly eight bytes.
pub fn decode_u64(what: &'static str, bytes: &[u8]) -> WireResult<u64> {
    exact::<8>(what, bytes).map(u64::from_le_bytes)
}

fn exact<const N: usize>(what: &'static str, bytes: &[u8]) -> WireResult<[u8; N]> {
    bytes.try_into().map_err(|_| DecodeError::SizeMismatch {
        what,
        expected: N,
        actual: bytes.len(),
    })
}
