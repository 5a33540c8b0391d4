//! gm-macro - Input macro recording and replay
//!
//! Captures live pointer/keyboard input into a timestamped event log and
//! replays logs with faithful relative timing, optional looping, and
//! prompt cancellation. The OS boundary is the [`backend::InputBackend`]
//! trait, so the engine itself runs (and is tested) without real input
//! hardware.

pub mod backend;
pub mod controller;
pub mod platform;
pub mod player;
pub mod recorder;

pub use backend::{InputBackend, InputListener, InputSink, RawInput};
pub use controller::{MacroController, MacroStatus};
pub use player::{PlayOptions, PlayStats, Player};
pub use recorder::{CaptureHandle, Recorder, RecorderConfig};
