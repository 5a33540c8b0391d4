//! Cancellable waits
//!
//! The player suspends between events and between loop repetitions; those
//! waits must end immediately when stop-playback arrives, not when the
//! timer expires. A mutex/condvar pair gives deterministic stop latency;
//! any polling interval callers layer on top is only an upper bound.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: Mutex<bool>,
    cond: Condvar,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel and wake every in-flight wait.
    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        *cancelled = true;
        self.inner.cond.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Block for up to `timeout`. Returns true if the token was cancelled
    /// (before or during the wait), false if the full timeout elapsed.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let mut cancelled = self.inner.cancelled.lock();
        if *cancelled {
            return true;
        }
        self.inner
            .cond
            .wait_while_for(&mut cancelled, |c| !*c, timeout);
        *cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn wait_runs_to_timeout_when_not_cancelled() {
        let token = CancelToken::new();
        let start = Instant::now();
        assert!(!token.wait_for(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn cancel_interrupts_a_long_wait() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = std::thread::spawn(move || {
            let start = Instant::now();
            let cancelled = waiter.wait_for(Duration::from_secs(10));
            (cancelled, start.elapsed())
        });
        std::thread::sleep(Duration::from_millis(50));
        token.cancel();
        let (cancelled, waited) = handle.join().unwrap();
        assert!(cancelled);
        assert!(waited < Duration::from_secs(1));
    }

    #[test]
    fn wait_after_cancel_returns_immediately() {
        let token = CancelToken::new();
        token.cancel();
        let start = Instant::now();
        assert!(token.wait_for(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
