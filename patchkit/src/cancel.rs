//! Cooperative cancellation between the monitor and the worker.
//!
//! [`CancelToken`] is a shared one-way flag: once cancelled it stays
//! cancelled. A condition variable backs [`CancelToken::wait_timeout`] so
//! the monitor can cut a blocking wait short without either side spinning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Shared one-shot cancellation token.
///
/// Cloning yields another handle to the same token. Exactly one side (the
/// monitor) calls [`cancel`](CancelToken::cancel); everyone else reads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    signal: Condvar,
}

impl CancelToken {
    /// Create a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake any pending [`wait_timeout`](Self::wait_timeout).
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let _guard = self.inner.lock.lock().unwrap();
        self.inner.signal.notify_all();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Block for up to `timeout`, returning as soon as the token is
    /// cancelled.
    ///
    /// Returns `true` if cancellation was requested, `false` if the full
    /// timeout elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.inner.lock.lock().unwrap();

        loop {
            if self.is_cancelled() {
                return true;
            }
            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(remaining) if !remaining.is_zero() => remaining,
                _ => return self.is_cancelled(),
            };
            let (g, result) = self.inner.signal.wait_timeout(guard, remaining).unwrap();
            guard = g;
            if result.timed_out() {
                return self.is_cancelled();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_one_way() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_wait_timeout_expires() {
        let token = CancelToken::new();
        let start = Instant::now();
        let cancelled = token.wait_timeout(Duration::from_millis(20));
        assert!(!cancelled);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_cancel_wakes_waiter() {
        let token = CancelToken::new();
        let waker = token.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            waker.cancel();
        });

        let start = Instant::now();
        let cancelled = token.wait_timeout(Duration::from_secs(10));
        handle.join().unwrap();

        assert!(cancelled);
        // Woke well before the ten second timeout.
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_wait_timeout_returns_immediately_when_already_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.wait_timeout(Duration::from_secs(10)));
    }
}
