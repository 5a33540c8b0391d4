//! Session control
//!
//! [`MacroController`] is the single owner of the recording/playback
//! state machine: it enforces the one-active-session rule, hands logs
//! between the recorder and player, and maps stop requests onto the
//! cancel token. It holds no algorithmic logic of its own.

use crate::backend::InputBackend;
use crate::player::{PlayOptions, Player};
use crate::recorder::{CaptureHandle, Recorder};
use gm_core::{
    Activity, CancelToken, Error, MacroEvent, MacroLog, MouseButton, Result, SessionState,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Offset between the synthetic press and release of one clicker cycle.
const CLICKER_HOLD: Duration = Duration::from_millis(50);
/// Where inside the target window the clicker posts its clicks.
const CLICKER_POS: (i32, i32) = (100, 100);

#[derive(Debug, Clone, Serialize)]
pub struct MacroStatus {
    pub recording: bool,
    pub playing: bool,
    pub macro_length: usize,
}

struct PlaybackHandle {
    cancel: CancelToken,
    thread: Option<thread::JoinHandle<()>>,
}

pub struct MacroController {
    state: Arc<SessionState>,
    backend: Arc<dyn InputBackend>,
    recorder: Recorder,
    /// Most recent recording buffer; appended to live while capturing,
    /// kept after stop so status can report its length, reset by the
    /// next start-recording.
    live: Arc<Mutex<Vec<MacroEvent>>>,
    capture: Mutex<Option<CaptureHandle>>,
    playback: Mutex<Option<PlaybackHandle>>,
}

impl MacroController {
    pub fn new(backend: Arc<dyn InputBackend>) -> Self {
        Self {
            state: Arc::new(SessionState::new()),
            backend,
            recorder: Recorder::new(),
            live: Arc::new(Mutex::new(Vec::new())),
            capture: Mutex::new(None),
            playback: Mutex::new(None),
        }
    }

    /// Begin a capture session. Rejected while anything is active;
    /// observer-installation failure surfaces as `CaptureError` with the
    /// session left inactive.
    pub fn start_recording(&self) -> Result<()> {
        let guard = self.state.begin_guarded(Activity::Recording)?;

        let listener = match self.backend.listener() {
            Ok(l) => l,
            Err(e) => {
                // Guard drops here, clearing the recording state.
                drop(guard);
                return Err(Error::capture(e.message));
            }
        };

        let mut slot = self.capture.lock();
        if let Some(stale) = slot.take() {
            // Left behind by a faulted collector; its guard already
            // cleared the state, the threads just need reaping.
            stale.stop();
        }
        // On a failed install the recorder has joined the listener and
        // dropped the guard; nothing is left to tear down.
        *slot = Some(self.recorder.start(listener, self.live.clone(), guard)?);
        info!("recording started");
        Ok(())
    }

    /// End the capture session and hand the finished log to the caller.
    pub fn stop_recording(&self) -> Result<MacroLog> {
        let handle = self
            .capture
            .lock()
            .take()
            .ok_or_else(|| Error::not_active("recording"))?;
        handle.stop();

        let log = MacroLog::new(self.live.lock().clone());
        info!(events = log.len(), "recording stopped");
        Ok(log)
    }

    /// Replay a caller-supplied log on a dedicated thread.
    pub fn play(&self, log: MacroLog, loop_playback: bool, interval: Duration) -> Result<()> {
        Player::validate(&log)?;
        let sink = self
            .backend
            .synthesizer()
            .map_err(|e| Error::playback(e.message))?;
        self.spawn_playback(
            log,
            PlayOptions {
                loop_playback,
                interval,
            },
            sink,
        )?;
        info!("playback started");
        Ok(())
    }

    /// Degenerate playback: a synthetic click pair posted to one window,
    /// looped at `interval` until stopped.
    pub fn start_clicker(&self, hwnd: isize, interval: Duration) -> Result<()> {
        let sink = self
            .backend
            .window_clicker(hwnd)
            .map_err(|e| Error::playback(e.message))?;
        self.spawn_playback(
            clicker_log(),
            PlayOptions {
                loop_playback: true,
                interval,
            },
            sink,
        )?;
        info!(hwnd, "background clicker started");
        Ok(())
    }

    fn spawn_playback(
        &self,
        log: MacroLog,
        opts: PlayOptions,
        mut sink: Box<dyn crate::backend::InputSink>,
    ) -> Result<()> {
        let guard = self.state.begin_guarded(Activity::Playing)?;

        // The slot lock is held across the spawn and only released once
        // the new token is stored, so a stop request racing this call
        // either runs before the session exists or cancels this run's
        // token, never a stale one.
        let mut slot = self.playback.lock();
        if let Some(mut old) = slot.take() {
            // The state was Idle, so the previous run has released its
            // guard; joining only reaps the thread.
            if let Some(t) = old.thread.take() {
                let _ = t.join();
            }
        }

        let cancel = CancelToken::new();
        let token = cancel.clone();
        let thread = thread::spawn(move || {
            let _guard = guard;
            match Player::play(&log, &opts, sink.as_mut(), &token) {
                Ok(_) => {}
                Err(e) => warn!(error = %e, "playback aborted"),
            }
        });
        *slot = Some(PlaybackHandle {
            cancel,
            thread: Some(thread),
        });
        Ok(())
    }

    /// Request playback stop. Idempotent: succeeds when nothing plays.
    pub fn stop_playback(&self) {
        if let Some(handle) = &*self.playback.lock() {
            handle.cancel.cancel();
        }
    }

    pub fn status(&self) -> MacroStatus {
        MacroStatus {
            recording: self.state.is_recording(),
            playing: self.state.is_playing(),
            macro_length: self.live.lock().len(),
        }
    }
}

impl Drop for MacroController {
    fn drop(&mut self) {
        self.stop_playback();
        if let Some(handle) = self.capture.lock().take() {
            handle.stop();
        }
        if let Some(mut handle) = self.playback.lock().take() {
            if let Some(t) = handle.thread.take() {
                let _ = t.join();
            }
        }
    }
}

fn clicker_log() -> MacroLog {
    let (x, y) = CLICKER_POS;
    MacroLog::new(vec![
        MacroEvent::Click {
            x,
            y,
            button: MouseButton::Left,
            pressed: true,
            time: 0.0,
        },
        MacroEvent::Click {
            x,
            y,
            button: MouseButton::Left,
            pressed: false,
            time: CLICKER_HOLD.as_secs_f64(),
        },
    ])
}
