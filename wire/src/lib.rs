//! Wire framing and request/reply exchange for the blinkygram protocol.
//!
//! This crate handles the binary wire format: message headers, sequence
//! correlation, length-prefixed fields and the fixed-layout token and receipt
//! values. It does not know about connections or sessions, only about the bytes
//! of a single exchange.
//!
//! # Design Principles
//!
//! - **Bounded decoding** - Declared lengths are validated against [`Limits`]
//!   before any payload byte is read.
//! - **All-or-nothing exchanges** - A failed validation aborts the exchange; no
//!   partial reply is ever returned.
//! - **Little-endian throughout** - Header fields, integers and length prefixes.
//!
//! # Frame layout
//!
//! ```text
//! request: seq u32 | length u32 | kind u8   | payload
//! reply:   seq u32 | length u32 | status u8 | payload
//! ```
//!
//! `length` counts the bytes after the header.

mod error;
mod exchange;
pub mod field;
mod header;
mod kind;
mod limits;
mod types;

pub use error::{DecodeError, EncodeError, ExchangeError, ExchangeResult, WireResult};
pub use exchange::{
    encode_request, next_sequence, request, request_with_limits, validate_reply_header, Reply,
};
pub use header::{MessageHeader, HEADER_SIZE};
pub use kind::{ReplyStatus, RequestKind};
pub use limits::{Limits, MAX_MESSAGE_LEN};
pub use types::{decode_u64, AuthToken, ChatMessage, Signature, TransferReceipt, SIGNATURE_SIZE};
