//! Bot configuration.

use std::time::Duration;

/// Interval between keepalive echoes.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

/// Payload sent with each keepalive echo.
pub const DEFAULT_KEEPALIVE_PAYLOAD: &[u8] = b"PING";

/// Configuration for a [`Bot`](crate::Bot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Sleep between keepalive echoes.
    pub keepalive_interval: Duration,

    /// Bytes the keepalive echoes.
    pub keepalive_payload: Vec<u8>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            keepalive_payload: DEFAULT_KEEPALIVE_PAYLOAD.to_vec(),
        }
    }
}

impl BotConfig {
    /// Creates a configuration with a short keepalive interval for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            keepalive_interval: Duration::from_millis(50),
            ..Self::default()
        }
    }
}
