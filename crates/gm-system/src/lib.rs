//! gm-system - single-shot OS tuning services
//!
//! The managers the daemon exposes next to the macro engine: per-process
//! network usage, outbound firewall blocks, DNS benchmark/selection,
//! process priority boosting, RAM cleanup, installed-game scanning, key
//! remap profiles and the auto-launch watcher.
//!
//! Policy (targets, profiles, speed folding, config matching) is
//! platform-independent and tested; every OS call lives behind
//! [`platform`], which stubs to `NotImplemented` off Windows.

pub mod autolaunch;
pub mod boost;
pub mod dns;
pub mod firewall;
pub mod games;
pub mod monitor;
pub mod platform;
pub mod remap;
pub mod ultra;

pub use autolaunch::{ConfigStore, LaunchAction, LaunchEntry, LaunchWatcher, WatchHandle};
pub use boost::{Booster, CleanReport, SystemStats};
pub use dns::{DnsBenchmark, DnsManager, DnsProvider};
pub use firewall::FirewallManager;
pub use games::GameEntry;
pub use monitor::{IoSample, IoSampler, MonitorHandle, NetUsage, NetworkMonitor};
pub use platform::{CursorInfo, ProcessInfo, WindowInfo};
pub use remap::{RemapEngine, RemapProfile};
pub use ultra::UltraMode;
