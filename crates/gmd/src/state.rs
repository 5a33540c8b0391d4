//! Shared daemon state
//!
//! One instance of every manager, shared across the HTTP loop, the
//! hotkey poller and the auto-launch watcher.

use gm_macro::{InputBackend, MacroController};
use gm_system::{
    Booster, ConfigStore, DnsManager, FirewallManager, LaunchAction, NetworkMonitor, RemapEngine,
    UltraMode,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub struct AppState {
    pub controller: MacroController,
    pub monitor: Arc<NetworkMonitor>,
    pub firewall: FirewallManager,
    pub dns: DnsManager,
    pub ultra: UltraMode,
    pub booster: Booster,
    pub remap: RemapEngine,
    pub config: ConfigStore,
}

impl AppState {
    pub fn new(backend: Arc<dyn InputBackend>, config_path: PathBuf) -> Self {
        Self {
            controller: MacroController::new(backend),
            monitor: Arc::new(NetworkMonitor::new()),
            firewall: FirewallManager::new(),
            dns: DnsManager::new(),
            ultra: UltraMode::new(),
            booster: Booster::new(),
            remap: RemapEngine::new(),
            config: ConfigStore::new(config_path),
        }
    }

    /// Fire one configured auto-launch action for a freshly seen game
    /// pid. Failures are logged; one bad action must not stop the rest
    /// of the entry's list.
    pub fn perform_action(&self, action: &LaunchAction, game_pid: u32) {
        let result = match action {
            LaunchAction::RemapProfile { profile } => self.remap.start(*profile),
            LaunchAction::UltraMode => self.ultra.enable(game_pid),
            LaunchAction::BackgroundClicker { hwnd, interval } => self
                .controller
                .start_clicker(*hwnd as isize, Duration::from_millis(*interval)),
            LaunchAction::SetDns { provider } => match self.dns.provider_ip(provider) {
                Some(ip) => self.dns.set_dns(ip),
                None => {
                    warn!(provider = %provider, "unknown dns provider in config");
                    return;
                }
            },
            LaunchAction::CleanRam => {
                self.booster.clean_ram();
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!(?action, error = %e, "auto-launch action failed");
        }
    }
}
