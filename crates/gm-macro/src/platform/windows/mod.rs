//! Windows input backend
//!
//! Capture via WH_MOUSE_LL / WH_KEYBOARD_LL hooks, synthesis via
//! SendInput, background clicking via PostMessageW.

mod listener;
mod synth;

use crate::backend::{InputBackend, InputListener, InputSink};
use gm_core::Result;

pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBackend for NativeBackend {
    fn listener(&self) -> Result<Box<dyn InputListener>> {
        Ok(Box::new(listener::HookListener::new()))
    }

    fn synthesizer(&self) -> Result<Box<dyn InputSink>> {
        Ok(Box::new(synth::SendInputSink))
    }

    fn window_clicker(&self, hwnd: isize) -> Result<Box<dyn InputSink>> {
        Ok(Box::new(synth::WindowSink::new(hwnd)))
    }
}
