//! Error types for the RPC client.

use std::fmt;
use std::io;

use buffer::BufError;
use thiserror::Error;
use wire::{DecodeError, EncodeError, ExchangeError, RequestKind};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by [`RpcClient`](crate::RpcClient) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client is not connected")]
    NotConnected,

    #[error("client is already connected")]
    AlreadyConnected,

    #[error("client is closed")]
    Closed,

    #[error("failed to resolve {host}:{port}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("no address found for {host}:{port}")]
    NoAddress { host: String, port: u16 },

    #[error("failed to connect to {host}:{port}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] DecodeError),

    #[error("request encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("echo mismatch: sent {sent} bytes, received {received}")]
    EchoMismatch { sent: usize, received: usize },

    #[error("{kind} failed: {message}")]
    Server { kind: RequestKind, message: String },
}

/// Broad category of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The connection is missing or the socket failed.
    Transport,
    /// The server sent bytes that violate the protocol.
    Protocol,
    /// The server answered FAIL.
    Application,
    /// A local allocation or size limit was hit while building a request.
    Resource,
}

impl ClientError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConnected
            | Self::AlreadyConnected
            | Self::Closed
            | Self::Resolve { .. }
            | Self::NoAddress { .. }
            | Self::Connect { .. }
            | Self::Io(_) => ErrorKind::Transport,
            Self::Protocol(_) | Self::EchoMismatch { .. } => ErrorKind::Protocol,
            Self::Server { .. } => ErrorKind::Application,
            Self::Encode(_) => ErrorKind::Resource,
        }
    }

    /// Returns the server's message for an application failure.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<ExchangeError> for ClientError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Io(err) => Self::Io(err),
            ExchangeError::Encode(err) => Self::Encode(err),
            ExchangeError::Decode(err) => Self::Protocol(err),
        }
    }
}

impl From<BufError> for ClientError {
    fn from(err: BufError) -> Self {
        Self::Encode(EncodeError::Buffer(err))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::Protocol => "protocol",
            Self::Application => "application",
            Self::Resource => "resource",
        };
        f.write_str(name)
    }
}
