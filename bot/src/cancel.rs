//! Cancellation token shared by a bot's loops.
//!
//! One flag, plus a condition variable so that sleepers wake the moment the
//! flag is raised instead of at the end of their interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

/// A cloneable cancellation token.
///
/// Cancelling any clone is observed by all clones. Cancellation is one-way.
///
/// # Example
///
/// ```
/// use bot::CancellationToken;
/// use std::time::Duration;
///
/// let token = CancellationToken::new();
/// let waiter = token.clone();
/// let sleeper = std::thread::spawn(move || waiter.wait_timeout(Duration::from_secs(60)));
///
/// token.cancel();
/// assert!(sleeper.join().unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation and wakes every waiter.
    ///
    /// Returns `true` for the call that actually flipped the flag. Safe to call
    /// from any thread, any number of times.
    pub fn cancel(&self) -> bool {
        // The flag is raised under the lock so a waiter cannot check it and
        // then miss the notification.
        let _guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let first = !self.inner.cancelled.swap(true, Ordering::SeqCst);
        self.inner.wake.notify_all();
        first
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Sleeps for up to `timeout`, returning early on cancellation.
    ///
    /// Returns `true` if the token was cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if self.is_cancelled() {
                return true;
            }
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => Duration::MAX,
            };
            if remaining.is_zero() {
                return false;
            }
            guard = self
                .inner
                .wake
                .wait_timeout(guard, remaining)
                .map_or_else(|poisoned| poisoned.into_inner().0, |(guard, _)| guard);
        }
    }

    /// Returns `true` if both handles refer to the same token.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
