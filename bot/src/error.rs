//! Error types for the bot runtime.

use std::io;

use client::ClientError;
use thiserror::Error;

use crate::handler::HandlerError;

/// Result type for bot operations.
pub type BotResult<T> = Result<T, BotError>;

/// Errors that start a bot's shutdown or prevent it from starting.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("bot was already started")]
    AlreadyStarted,

    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("message handler failed: {0}")]
    Handler(#[source] HandlerError),

    #[error("failed to spawn {name} thread")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_converts() {
        let err = BotError::from(ClientError::Closed);
        assert!(matches!(err, BotError::Client(ClientError::Closed)));
        assert_eq!(err.to_string(), "client error: client is closed");
    }

    #[test]
    fn handler_error_keeps_source() {
        let err = BotError::Handler("bad command".into());
        assert!(err.to_string().contains("bad command"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
