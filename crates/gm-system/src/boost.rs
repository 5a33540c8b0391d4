//! Memory stats and RAM cleanup
//!
//! Cleanup terminates a fixed list of known background hogs and reports
//! what was killed and how much resident memory that released.

use crate::platform;
use serde::Serialize;
use tracing::info;

/// Background applications the cleaner is allowed to terminate.
pub const RAM_TARGETS: [&str; 5] = [
    "chrome.exe",
    "firefox.exe",
    "msedge.exe",
    "discord.exe",
    "spotify.exe",
];

#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    pub ram_total: u64,
    pub ram_available: u64,
    pub ram_percent: f32,
    pub cpu_percent: f32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    pub killed: Vec<String>,
    pub freed_bytes: u64,
}

pub fn is_ram_target(process_name: &str) -> bool {
    RAM_TARGETS
        .iter()
        .any(|t| t.eq_ignore_ascii_case(process_name))
}

#[derive(Default)]
pub struct Booster;

impl Booster {
    pub fn new() -> Self {
        Self
    }

    pub fn stats(&self) -> gm_core::Result<SystemStats> {
        platform::system_stats()
    }

    /// Terminate every running target process.
    pub fn clean_ram(&self) -> CleanReport {
        let mut report = CleanReport::default();
        for proc in platform::process_list() {
            if !is_ram_target(&proc.name) {
                continue;
            }
            // Read the resident size before the kill or it is gone.
            let rss = platform::process_memory(proc.pid).unwrap_or(0);
            if platform::terminate(proc.pid).is_ok() {
                report.freed_bytes += rss;
                report.killed.push(proc.name);
            }
        }
        info!(
            killed = report.killed.len(),
            freed = report.freed_bytes,
            "ram cleaned"
        );
        report
    }
}
