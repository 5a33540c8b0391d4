//! Ultra mode
//!
//! Raises the game process to high priority and demotes the known
//! background applications to idle. Disable restores everything that was
//! demoted; the pid list is kept so restore touches exactly the processes
//! this manager changed.

use crate::platform::{self, PriorityClass};
use gm_core::{Error, Result};
use parking_lot::Mutex;
use tracing::{info, warn};

/// Background applications demoted while ultra mode is active.
pub const ULTRA_TARGETS: [&str; 6] = [
    "chrome.exe",
    "firefox.exe",
    "msedge.exe",
    "discord.exe",
    "spotify.exe",
    "steamwebhelper.exe",
];

struct Session {
    game_pid: u32,
    demoted: Vec<u32>,
}

#[derive(Default)]
pub struct UltraMode {
    session: Mutex<Option<Session>>,
}

pub fn is_ultra_target(process_name: &str) -> bool {
    ULTRA_TARGETS
        .iter()
        .any(|t| t.eq_ignore_ascii_case(process_name))
}

impl UltraMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.lock().is_some()
    }

    pub fn enable(&self, game_pid: u32) -> Result<()> {
        let mut slot = self.session.lock();
        if slot.is_some() {
            return Err(Error::already_active("in ultra mode"));
        }

        platform::set_priority(game_pid, PriorityClass::High)?;

        let mut demoted = Vec::new();
        for proc in platform::process_list() {
            if proc.pid != game_pid && is_ultra_target(&proc.name) {
                match platform::set_priority(proc.pid, PriorityClass::Idle) {
                    Ok(()) => demoted.push(proc.pid),
                    Err(e) => warn!(pid = proc.pid, error = %e, "demotion failed"),
                }
            }
        }

        info!(game_pid, demoted = demoted.len(), "ultra mode enabled");
        *slot = Some(Session { game_pid, demoted });
        Ok(())
    }

    pub fn disable(&self) -> Result<()> {
        let session = self
            .session
            .lock()
            .take()
            .ok_or_else(|| Error::not_active("in ultra mode"))?;

        if let Err(e) = platform::set_priority(session.game_pid, PriorityClass::Normal) {
            warn!(pid = session.game_pid, error = %e, "game priority restore failed");
        }
        for pid in session.demoted {
            // Processes may have exited in the meantime.
            if let Err(e) = platform::set_priority(pid, PriorityClass::Normal) {
                warn!(pid, error = %e, "priority restore failed");
            }
        }

        info!("ultra mode disabled");
        Ok(())
    }
}
