//! Process-wide session state
//!
//! The daemon allows at most one activity (recording or playback) at a
//! time. A single atomic cell holds the current activity so an illegal
//! double-activation cannot be expressed; callers only get the transition
//! operations, never the raw flag.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const IDLE: u8 = 0;
const RECORDING: u8 = 1;
const PLAYING: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Recording,
    Playing,
}

impl Activity {
    fn code(self) -> u8 {
        match self {
            Activity::Recording => RECORDING,
            Activity::Playing => PLAYING,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Activity::Recording => "recording",
            Activity::Playing => "playing",
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    current: AtomicU8,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition Idle -> activity. Rejected (never queued) if anything
    /// is already active.
    pub fn begin(&self, activity: Activity) -> Result<()> {
        match self.current.compare_exchange(
            IDLE,
            activity.code(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => Ok(()),
            Err(RECORDING) => Err(Error::already_active("recording")),
            Err(_) => Err(Error::already_active("playing")),
        }
    }

    /// Transition activity -> Idle. A no-op (returning false) if some
    /// other activity owns the state, so a stale worker can never clobber
    /// a newer session.
    pub fn end(&self, activity: Activity) -> bool {
        self.current
            .compare_exchange(activity.code(), IDLE, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_recording(&self) -> bool {
        self.current.load(Ordering::SeqCst) == RECORDING
    }

    pub fn is_playing(&self) -> bool {
        self.current.load(Ordering::SeqCst) == PLAYING
    }

    pub fn is_idle(&self) -> bool {
        self.current.load(Ordering::SeqCst) == IDLE
    }

    /// Begin an activity and get a guard that ends it on drop. The guard
    /// travels into the worker thread, so the state is cleared even if
    /// the worker faults.
    pub fn begin_guarded(self: &Arc<Self>, activity: Activity) -> Result<ActivityGuard> {
        self.begin(activity)?;
        Ok(ActivityGuard {
            state: Arc::clone(self),
            activity,
        })
    }
}

/// Clears its activity when dropped.
#[derive(Debug)]
pub struct ActivityGuard {
    state: Arc<SessionState>,
    activity: Activity,
}

impl ActivityGuard {
    pub fn activity(&self) -> Activity {
        self.activity
    }
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        // False only if another session already owns the state, in which
        // case there is nothing for this guard to clean up.
        let _ = self.state.end(self.activity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_rejected() {
        let s = SessionState::new();
        s.begin(Activity::Recording).unwrap();
        let err = s.begin(Activity::Recording).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::AlreadyActive);
        let err = s.begin(Activity::Playing).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::AlreadyActive);
    }

    #[test]
    fn at_most_one_activity() {
        let s = SessionState::new();
        s.begin(Activity::Playing).unwrap();
        assert!(s.is_playing());
        assert!(!s.is_recording());
        assert!(s.begin(Activity::Recording).is_err());
        assert!(s.end(Activity::Playing));
        assert!(s.is_idle());
    }

    #[test]
    fn end_from_wrong_activity_is_a_noop() {
        let s = SessionState::new();
        s.begin(Activity::Recording).unwrap();
        assert!(!s.end(Activity::Playing));
        assert!(s.is_recording());
    }

    #[test]
    fn guard_clears_state_on_drop() {
        let s = Arc::new(SessionState::new());
        {
            let _g = s.begin_guarded(Activity::Playing).unwrap();
            assert!(s.is_playing());
        }
        assert!(s.is_idle());
    }

    #[test]
    fn guard_survives_panic() {
        let s = Arc::new(SessionState::new());
        let s2 = Arc::clone(&s);
        let res = std::thread::spawn(move || {
            let _g = s2.begin_guarded(Activity::Recording).unwrap();
            panic!("worker fault");
        })
        .join();
        assert!(res.is_err());
        assert!(s.is_idle());
    }
}
