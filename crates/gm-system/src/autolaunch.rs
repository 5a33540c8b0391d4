//! Auto-launch configuration and watcher
//!
//! The config maps a game executable to an ordered list of actions fired
//! once when that executable is seen running. The watcher polls the
//! process list and keeps a handled-pid set so a long game session
//! triggers its actions exactly once.

use crate::platform::ProcessInfo;
use crate::remap::RemapProfile;
use gm_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

fn default_clicker_interval() -> u64 {
    1000
}

/// An action fired when a configured game launches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LaunchAction {
    RemapProfile {
        profile: RemapProfile,
    },
    UltraMode,
    BackgroundClicker {
        hwnd: i64,
        #[serde(default = "default_clicker_interval")]
        interval: u64,
    },
    SetDns {
        provider: String,
    },
    CleanRam,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchEntry {
    pub exe_path: String,
    #[serde(default)]
    pub actions: Vec<LaunchAction>,
}

/// JSON config file, written atomically via a temp file.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing file is an empty config, not an error.
    pub fn load(&self) -> Result<Vec<LaunchEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, entries: &[LaunchEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// New (entry index, pid) matches in this poll. Matched pids go into
/// `handled` so they never fire twice. Paths compare case-insensitively,
/// matching how Windows reports executable paths.
pub fn match_new_launches(
    entries: &[LaunchEntry],
    processes: &[ProcessInfo],
    handled: &mut HashSet<u32>,
) -> Vec<(usize, u32)> {
    let mut hits = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        if entry.exe_path.is_empty() {
            continue;
        }
        for proc in processes {
            let Some(exe) = &proc.exe else { continue };
            if exe.eq_ignore_ascii_case(&entry.exe_path) && handled.insert(proc.pid) {
                hits.push((idx, proc.pid));
            }
        }
    }
    hits
}

pub type ProcessLister = Arc<dyn Fn() -> Vec<ProcessInfo> + Send + Sync>;
pub type ActionDispatcher = Arc<dyn Fn(&LaunchAction, u32) + Send + Sync>;

pub struct LaunchWatcher {
    store: ConfigStore,
    lister: ProcessLister,
    dispatcher: ActionDispatcher,
    poll: Duration,
}

/// Owns the watcher thread; stops and joins on drop.
pub struct WatchHandle {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

impl LaunchWatcher {
    pub fn new(store: ConfigStore, lister: ProcessLister, dispatcher: ActionDispatcher) -> Self {
        Self {
            store,
            lister,
            dispatcher,
            poll: Duration::from_secs(2),
        }
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    pub fn spawn(self) -> WatchHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let thread = thread::spawn(move || {
            let mut handled = HashSet::new();
            while !thread_stop.load(Ordering::SeqCst) {
                self.poll_once(&mut handled);
                thread::sleep(self.poll);
            }
        });
        WatchHandle {
            stop,
            thread: Some(thread),
        }
    }

    fn poll_once(&self, handled: &mut HashSet<u32>) {
        let entries = match self.store.load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "auto-launch config unreadable");
                return;
            }
        };
        if entries.is_empty() {
            return;
        }

        let processes = (self.lister)();
        for (idx, pid) in match_new_launches(&entries, &processes, handled) {
            let entry = &entries[idx];
            info!(exe = %entry.exe_path, pid, "configured game launched");
            for action in &entry.actions {
                (self.dispatcher)(action, pid);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: u32, exe: &str) -> ProcessInfo {
        ProcessInfo {
            pid,
            name: "game.exe".into(),
            exe: Some(exe.into()),
        }
    }

    fn entry(exe: &str, actions: Vec<LaunchAction>) -> LaunchEntry {
        LaunchEntry {
            exe_path: exe.into(),
            actions,
        }
    }

    #[test]
    fn config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("autolaunch.json"));
        assert!(store.load().unwrap().is_empty());

        let entries = vec![entry(
            r"C:\Games\rpg\game.exe",
            vec![
                LaunchAction::RemapProfile {
                    profile: RemapProfile::Classic,
                },
                LaunchAction::UltraMode,
                LaunchAction::SetDns {
                    provider: "Cloudflare".into(),
                },
            ],
        )];
        store.save(&entries).unwrap();
        assert_eq!(store.load().unwrap(), entries);
    }

    #[test]
    fn action_wire_format_is_tagged() {
        let action = LaunchAction::BackgroundClicker {
            hwnd: 66130,
            interval: 500,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "background_clicker");
        assert_eq!(json["hwnd"], 66130);

        // interval falls back when omitted
        let parsed: LaunchAction =
            serde_json::from_str(r#"{"type":"background_clicker","hwnd":7}"#).unwrap();
        assert_eq!(
            parsed,
            LaunchAction::BackgroundClicker {
                hwnd: 7,
                interval: 1000
            }
        );
    }

    #[test]
    fn a_pid_only_fires_once() {
        let entries = vec![entry(r"C:\Games\game.exe", vec![LaunchAction::CleanRam])];
        let procs = vec![proc(41, r"C:\Games\game.exe")];
        let mut handled = HashSet::new();

        let first = match_new_launches(&entries, &procs, &mut handled);
        assert_eq!(first, vec![(0, 41)]);
        let second = match_new_launches(&entries, &procs, &mut handled);
        assert!(second.is_empty());
    }

    #[test]
    fn path_matching_ignores_case() {
        let entries = vec![entry(r"C:\Games\Game.EXE", vec![])];
        let procs = vec![proc(7, r"c:\games\game.exe")];
        let mut handled = HashSet::new();
        assert_eq!(match_new_launches(&entries, &procs, &mut handled).len(), 1);
    }

    #[test]
    fn a_relaunch_with_a_new_pid_fires_again() {
        let entries = vec![entry(r"C:\Games\game.exe", vec![])];
        let mut handled = HashSet::new();
        match_new_launches(&entries, &[proc(41, r"C:\Games\game.exe")], &mut handled);
        let hits =
            match_new_launches(&entries, &[proc(42, r"C:\Games\game.exe")], &mut handled);
        assert_eq!(hits, vec![(0, 42)]);
    }
}
