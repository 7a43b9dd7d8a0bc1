//! Counters a running bot keeps.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Live counters, updated by the loop threads.
#[derive(Debug, Default)]
pub struct BotStats {
    messages_handled: AtomicU64,
    keepalives_sent: AtomicU64,
    failed: AtomicBool,
}

/// A point-in-time copy of [`BotStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub messages_handled: u64,
    pub keepalives_sent: u64,
    pub failed: bool,
}

impl BotStats {
    pub(crate) fn record_message(&self) {
        self.messages_handled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_keepalive(&self) {
        self.keepalives_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once any loop has failed.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    /// Copies the current values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            messages_handled: self.messages_handled.load(Ordering::Relaxed),
            keepalives_sent: self.keepalives_sent.load(Ordering::Relaxed),
            failed: self.has_failed(),
        }
    }
}
