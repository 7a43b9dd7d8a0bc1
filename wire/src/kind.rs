//! Request kinds and reply status codes.

use std::fmt;

use crate::error::{DecodeError, WireResult};

/// Request kinds understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RequestKind {
    Echo = 0x00,
    Register = 0x01,
    Auth = 0x02,
    UserId = 0x03,
    Username = 0x04,
    PublicKey = 0x05,
    ChatSend = 0x06,
    ChatRead = 0x07,
    Balance = 0x08,
    Transfer = 0x09,
    Receive = 0x0a,
    Mint = 0x0b,
    CheckReceipt = 0x0c,
    NewBackup = 0x0d,
    GetBackup = 0x0e,
}

impl RequestKind {
    /// Every kind, in wire order.
    pub const ALL: [Self; 15] = [
        Self::Echo,
        Self::Register,
        Self::Auth,
        Self::UserId,
        Self::Username,
        Self::PublicKey,
        Self::ChatSend,
        Self::ChatRead,
        Self::Balance,
        Self::Transfer,
        Self::Receive,
        Self::Mint,
        Self::CheckReceipt,
        Self::NewBackup,
        Self::GetBackup,
    ];

    /// Parses a request kind from a raw byte.
    pub fn parse(kind: u8) -> WireResult<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_u8() == kind)
            .ok_or(DecodeError::UnknownKind { kind })
    }

    /// Returns the wire byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the protocol name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Echo => "ECHO",
            Self::Register => "REGISTER",
            Self::Auth => "AUTH",
            Self::UserId => "USERID",
            Self::Username => "USERNAME",
            Self::PublicKey => "PUBKEY",
            Self::ChatSend => "CHAT_SEND",
            Self::ChatRead => "CHAT_READ",
            Self::Balance => "BALANCE",
            Self::Transfer => "TRANSFER",
            Self::Receive => "RECEIVE",
            Self::Mint => "MINT",
            Self::CheckReceipt => "CHECK_RECEIPT",
            Self::NewBackup => "NEW_BACKUP",
            Self::GetBackup => "GET_BACKUP",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reply status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReplyStatus {
    Ok = 0x00,
    Fail = 0x01,
}

impl ReplyStatus {
    /// Parses a status from a raw byte.
    pub const fn parse(status: u8) -> WireResult<Self> {
        match status {
            0x00 => Ok(Self::Ok),
            0x01 => Ok(Self::Fail),
            _ => Err(DecodeError::InvalidStatus { status }),
        }
    }

    /// Returns the wire byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_values_match_protocol() {
        assert_eq!(RequestKind::Echo.as_u8(), 0);
        assert_eq!(RequestKind::Receive.as_u8(), 10);
        assert_eq!(RequestKind::GetBackup.as_u8(), 14);
    }

    #[test]
    fn kind_parse_every_value() {
        for (i, kind) in RequestKind::ALL.iter().enumerate() {
            assert_eq!(RequestKind::parse(u8::try_from(i).unwrap()).unwrap(), *kind);
        }
    }

    #[test]
    fn kind_parse_unknown() {
        assert_eq!(
            RequestKind::parse(15),
            Err(DecodeError::UnknownKind { kind: 15 })
        );
        assert!(RequestKind::parse(0xFF).is_err());
    }

    #[test]
    fn kind_display_uses_protocol_name() {
        assert_eq!(RequestKind::ChatRead.to_string(), "CHAT_READ");
        assert_eq!(RequestKind::PublicKey.to_string(), "PUBKEY");
    }

    #[test]
    fn status_parse() {
        assert_eq!(ReplyStatus::parse(0), Ok(ReplyStatus::Ok));
        assert_eq!(ReplyStatus::parse(1), Ok(ReplyStatus::Fail));
        assert_eq!(
            ReplyStatus::parse(2),
            Err(DecodeError::InvalidStatus { status: 2 })
        );
    }
}
