//! Callbacks the bot drives.

use crate::error::BotError;

/// Error a message handler may return; it stops the bot.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Receives each chat message the bot pulls from the server.
///
/// Runs on the bot's message thread. Returning an error stops the bot exactly
/// like a transport failure would.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, sender: u64, timestamp: u64, content: &str) -> Result<(), HandlerError>;
}

impl<F> MessageHandler for F
where
    F: Fn(u64, u64, &str) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, sender: u64, timestamp: u64, content: &str) -> Result<(), HandlerError> {
        self(sender, timestamp, content)
    }
}

/// Notified when a loop fails, before the bot stops.
///
/// May be called from either loop thread, and more than once if both loops
/// fail. Calling back into the bot's stop from here is allowed.
pub trait ErrorHandler: Send + Sync {
    fn on_error(&self, error: &BotError);
}

impl<F> ErrorHandler for F
where
    F: Fn(&BotError) + Send + Sync,
{
    fn on_error(&self, error: &BotError) {
        self(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn closure_message_handler() {
        let handler = |sender: u64, _: u64, content: &str| -> Result<(), HandlerError> {
            if sender == 0 {
                return Err(format!("rejected {content}").into());
            }
            Ok(())
        };
        assert!(handler.handle(1, 0, "hi").is_ok());
        let err = handler.handle(0, 0, "hi").unwrap_err();
        assert_eq!(err.to_string(), "rejected hi");
    }

    #[test]
    fn closure_error_handler() {
        let calls = AtomicUsize::new(0);
        let handler = |_: &BotError| {
            calls.fetch_add(1, Ordering::SeqCst);
        };
        handler.on_error(&BotError::AlreadyStarted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
