//! Key remap profiles
//!
//! Four fixed source-to-replacement tables. The engine swallows each
//! source key at the hook and emits its replacement, so from the game's
//! point of view the replacement was pressed. Starting a profile while
//! another is active replaces it; stop is idempotent.

use crate::platform;
use gm_core::{Key, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemapProfile {
    Classic,
    Option2,
    Mirror,
    Numpad,
}

impl RemapProfile {
    /// (source, replacement) pairs for this profile.
    pub fn mappings(self) -> &'static [(Key, Key)] {
        use Key::*;
        match self {
            RemapProfile::Classic => &[
                (Up, W),
                (Down, S),
                (Left, A),
                (Right, D),
                (Space, Num1),
                (Tab, PageDown),
            ],
            RemapProfile::Option2 => &[
                (Enter, W),
                (Up, S),
                (RightShift, A),
                (Num1, D),
                (Left, Z),
                (Down, X),
                (Right, C),
                (Num4, E),
                (Comma, Q),
                (Tab, PageDown),
            ],
            RemapProfile::Mirror => &[
                (P, Q),
                (O, W),
                (I, E),
                (U, R),
                (L, S),
                (K, D),
                (J, F),
                (M, V),
            ],
            RemapProfile::Numpad => &[
                (Num8, W),
                (Num5, S),
                (Num4, A),
                (Num6, D),
                (Num7, Q),
                (Num9, E),
                (Num0, Space),
                (Enter, F),
            ],
        }
    }
}

#[derive(Default)]
pub struct RemapEngine {
    active: Mutex<Option<RemapProfile>>,
}

impl RemapEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<RemapProfile> {
        *self.active.lock()
    }

    /// Apply a profile, replacing any profile currently active.
    pub fn start(&self, profile: RemapProfile) -> Result<()> {
        let mut active = self.active.lock();
        if active.is_some() {
            platform::remove_remap_hook()?;
            *active = None;
        }
        platform::install_remap_hook(profile.mappings())?;
        *active = Some(profile);
        info!(?profile, "remap started");
        Ok(())
    }

    /// Remove the active profile. Succeeds when none is active.
    pub fn stop(&self) -> Result<()> {
        let mut active = self.active.lock();
        if active.take().is_some() {
            platform::remove_remap_hook()?;
            info!("remap stopped");
        }
        Ok(())
    }
}
