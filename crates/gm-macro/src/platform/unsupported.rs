//! Stub backend for platforms without an input implementation

use crate::backend::{InputBackend, InputListener, InputSink};
use gm_core::{Error, Result};

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
        Err(Error::not_implemented("input capture"))
    }

    fn synthesizer(&self) -> Result<Box<dyn InputSink>> {
        Err(Error::not_implemented("synthetic input"))
    }

    fn window_clicker(&self, _hwnd: isize) -> Result<Box<dyn InputSink>> {
        Err(Error::not_implemented("window message input"))
    }
}
