//! Client configuration.

use std::time::Duration;

use wire::Limits;

/// Socket timeout applied to connect, send and receive.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for an [`RpcClient`](crate::RpcClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bound on every blocking socket call.
    pub timeout: Duration,

    /// Disable Nagle's algorithm on TCP connections.
    pub nodelay: bool,

    /// Reply decoding limits.
    pub limits: Limits,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            nodelay: true,
            limits: Limits::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with short timeouts for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            ..Self::default()
        }
    }

    /// Returns a copy with a different timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_ten_seconds() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.limits, Limits::default());
    }

    #[test]
    fn testing_config_is_faster() {
        assert!(ClientConfig::for_testing().timeout < ClientConfig::default().timeout);
    }

    #[test]
    fn with_timeout_overrides() {
        let config = ClientConfig::default().with_timeout(Duration::from_millis(5));
        assert_eq!(config.timeout, Duration::from_millis(5));
    }
}
