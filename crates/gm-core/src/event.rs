//! Macro event model
//!
//! Wire format (one object per event, `time` = seconds since capture
//! start):
//!
//! ```json
//! {"type":"move","x":120,"y":340,"time":0.0}
//! {"type":"click","x":120,"y":340,"button":"left","pressed":true,"time":0.05}
//! {"type":"key_down","key":"w","time":0.12}
//! {"type":"key_up","key":"w","time":0.2}
//! ```
//!
//! Offsets are relative to the capture anchor, never wall-clock absolute,
//! so a log replays identically regardless of when it was recorded.

use crate::error::{Error, Result};
use crate::keys::{Key, MouseButton};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single captured input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MacroEvent {
    Move {
        x: i32,
        y: i32,
        time: f64,
    },
    Click {
        x: i32,
        y: i32,
        button: MouseButton,
        pressed: bool,
        time: f64,
    },
    KeyDown {
        key: Key,
        time: f64,
    },
    KeyUp {
        key: Key,
        time: f64,
    },
}

impl MacroEvent {
    /// Offset from the capture anchor, in seconds.
    pub fn time(&self) -> f64 {
        match self {
            MacroEvent::Move { time, .. }
            | MacroEvent::Click { time, .. }
            | MacroEvent::KeyDown { time, .. }
            | MacroEvent::KeyUp { time, .. } => *time,
        }
    }

    /// Offset as a Duration. Errors on negative or non-finite times,
    /// which only a hand-crafted log can contain.
    pub fn offset(&self) -> Result<Duration> {
        let t = self.time();
        if !t.is_finite() || t < 0.0 {
            return Err(Error::invalid_event(format!(
                "event offset {} is not a non-negative duration",
                t
            )));
        }
        Ok(Duration::from_secs_f64(t))
    }
}

/// An ordered, immutable-once-finalized sequence of input events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacroLog {
    events: Vec<MacroEvent>,
}

impl MacroLog {
    pub fn new(events: Vec<MacroEvent>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MacroEvent> {
        self.events.iter()
    }

    pub fn events(&self) -> &[MacroEvent] {
        &self.events
    }
}

impl IntoIterator for MacroLog {
    type Item = MacroEvent;
    type IntoIter = std::vec::IntoIter<MacroEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a MacroLog {
    type Item = &'a MacroEvent;
    type IntoIter = std::slice::Iter<'a, MacroEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl From<Vec<MacroEvent>> for MacroLog {
    fn from(events: Vec<MacroEvent>) -> Self {
        Self::new(events)
    }
}
