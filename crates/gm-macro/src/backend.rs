//! The OS input boundary
//!
//! Capture listens through an [`InputListener`] pushing raw (untimed)
//! events into a channel; replay emits through an [`InputSink`]. The
//! engine never calls the OS directly, which keeps the timing and
//! state-machine logic testable with scripted listeners and recording
//! sinks.

use crossbeam_channel::Sender;
use gm_core::{Key, MacroEvent, MouseButton, Result};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// An input event as delivered by the OS, before timestamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    Move { x: i32, y: i32 },
    Button { x: i32, y: i32, button: MouseButton, pressed: bool },
    Key { key: Key, down: bool },
}

impl RawInput {
    /// Attach the capture offset (seconds since the session anchor).
    pub fn stamp(self, time: f64) -> MacroEvent {
        match self {
            RawInput::Move { x, y } => MacroEvent::Move { x, y, time },
            RawInput::Button { x, y, button, pressed } => MacroEvent::Click {
                x,
                y,
                button,
                pressed,
                time,
            },
            RawInput::Key { key, down: true } => MacroEvent::KeyDown { key, time },
            RawInput::Key { key, down: false } => MacroEvent::KeyUp { key, time },
        }
    }
}

/// Capture-side adapter. `run` owns the platform event loop: it installs
/// whatever observers it needs, forwards events into `tx`, polls `stop`,
/// and tears everything down before returning. Teardown must be
/// idempotent; observers must never outlive the call.
///
/// `ready` is a one-shot: send `Ok(())` once the observers are installed
/// and events can flow, or the installation error. The capture session
/// does not start until the signal arrives, and a listener that returns
/// without signalling counts as a failed install.
pub trait InputListener: Send {
    fn run(self: Box<Self>, tx: Sender<RawInput>, stop: Arc<AtomicBool>, ready: Sender<Result<()>>);
}

/// Replay-side adapter mapping log events onto synthetic input.
pub trait InputSink: Send {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()>;
    fn button(&mut self, x: i32, y: i32, button: MouseButton, pressed: bool) -> Result<()>;
    fn key(&mut self, key: Key, down: bool) -> Result<()>;
}

/// Factory for the platform's capture and synthesis adapters.
pub trait InputBackend: Send + Sync {
    /// A listener over the global input stream. Installation failures
    /// surface as `CaptureError` and leave no session behind.
    fn listener(&self) -> Result<Box<dyn InputListener>>;

    /// Synthetic input against the foreground input stream.
    fn synthesizer(&self) -> Result<Box<dyn InputSink>>;

    /// Synthetic input posted to one window, bypassing the foreground
    /// stream (the background-clicker emission path).
    fn window_clicker(&self, hwnd: isize) -> Result<Box<dyn InputSink>>;
}
