//! Outbound firewall blocks
//!
//! Each blocked executable gets one named netsh advfirewall rule so the
//! rules this daemon created can be found and removed without touching
//! anything else. The blocked set is tracked in memory; rules do not
//! survive a daemon restart unless re-applied.

use gm_core::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::info;

const RULE_PREFIX: &str = "GM_Block_";

/// Rule name for an executable path, derived from its file name. Splits
/// on both separators so Windows paths parse the same in tests anywhere.
pub fn rule_name(exe_path: &str) -> String {
    let base = exe_path
        .rsplit(['\\', '/'])
        .next()
        .unwrap_or(exe_path);
    format!("{}{}", RULE_PREFIX, base)
}

#[derive(Default)]
pub struct FirewallManager {
    blocked: Mutex<HashSet<String>>,
    whitelist: Mutex<HashSet<String>>,
}

impl FirewallManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an outbound block rule for `exe_path`. Whitelisted and
    /// already-blocked paths are rejected.
    pub fn block(&self, exe_path: &str) -> Result<()> {
        if exe_path.is_empty() {
            return Err(Error::bad_request("no executable path given"));
        }
        if self.whitelist.lock().contains(exe_path) {
            return Err(Error::bad_request(format!(
                "{} is whitelisted",
                exe_path
            )));
        }
        if self.blocked.lock().contains(exe_path) {
            return Err(Error::bad_request(format!(
                "{} is already blocked",
                exe_path
            )));
        }

        run_netsh(&[
            "advfirewall",
            "firewall",
            "add",
            "rule",
            &format!("name={}", rule_name(exe_path)),
            "dir=out",
            "action=block",
            &format!("program={}", exe_path),
        ])?;

        self.blocked.lock().insert(exe_path.to_string());
        info!(exe = exe_path, "blocked");
        Ok(())
    }

    /// Remove the block rule for `exe_path`.
    pub fn unblock(&self, exe_path: &str) -> Result<()> {
        if !self.blocked.lock().contains(exe_path) {
            return Err(Error::bad_request(format!("{} is not blocked", exe_path)));
        }

        run_netsh(&[
            "advfirewall",
            "firewall",
            "delete",
            "rule",
            &format!("name={}", rule_name(exe_path)),
        ])?;

        self.blocked.lock().remove(exe_path);
        info!(exe = exe_path, "unblocked");
        Ok(())
    }

    /// Remove every rule this manager created.
    pub fn clear_all(&self) {
        let blocked: Vec<String> = self.blocked.lock().iter().cloned().collect();
        for exe in blocked {
            // Best effort; a rule deleted out of band just logs.
            if let Err(e) = self.unblock(&exe) {
                tracing::warn!(exe = %exe, error = %e, "failed to clear rule");
            }
        }
    }

    pub fn is_blocked(&self, exe_path: &str) -> bool {
        self.blocked.lock().contains(exe_path)
    }

    pub fn whitelist(&self, exe_path: &str) {
        self.whitelist.lock().insert(exe_path.to_string());
    }
}

#[cfg(target_os = "windows")]
fn run_netsh(args: &[&str]) -> Result<()> {
    let status = std::process::Command::new("netsh")
        .args(args)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()?;
    if !status.success() {
        return Err(Error::bad_request(format!(
            "netsh exited with {}",
            status
        )));
    }
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run_netsh(_args: &[&str]) -> Result<()> {
    Err(Error::not_implemented("firewall control"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_name_uses_the_basename() {
        assert_eq!(
            rule_name(r"C:\Program Files\App\game.exe"),
            "GM_Block_game.exe"
        );
        assert_eq!(rule_name("solo.exe"), "GM_Block_solo.exe");
    }

    #[test]
    fn empty_path_is_rejected() {
        let fw = FirewallManager::new();
        assert!(fw.block("").is_err());
    }

    #[test]
    fn whitelisted_path_is_rejected() {
        let fw = FirewallManager::new();
        fw.whitelist(r"C:\game\anticheat.exe");
        let err = fw.block(r"C:\game\anticheat.exe").unwrap_err();
        assert!(err.message.contains("whitelisted"));
    }
}
