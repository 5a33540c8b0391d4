//! Per-process network usage
//!
//! A sampler thread reads cumulative per-process IO counters once per
//! period and folds them into a speed table: the delta between two
//! consecutive samples is that process's bytes-per-period. Processes seen
//! for the first time report zero until their second sample; processes
//! missing from a sample are dropped from the table.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// One cumulative IO reading for one process.
#[derive(Debug, Clone)]
pub struct IoSample {
    pub pid: u32,
    pub name: String,
    pub exe: Option<String>,
    /// Total bytes read + written since process start.
    pub bytes: u64,
}

/// Source of IO samples, one entry per live process.
pub trait IoSampler: Send + Sync {
    fn sample(&self) -> Vec<IoSample>;
}

/// A row of the usage table as reported on the control surface.
#[derive(Debug, Clone, Serialize)]
pub struct NetUsage {
    pub pid: u32,
    pub name: String,
    pub exe: Option<String>,
    /// Bytes transferred during the last sampling period.
    pub speed: u64,
}

struct Entry {
    name: String,
    exe: Option<String>,
    last_bytes: u64,
    speed: u64,
}

#[derive(Default)]
pub struct NetworkMonitor {
    entries: Mutex<HashMap<u32, Entry>>,
}

impl NetworkMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one round of samples into the speed table.
    pub fn record(&self, samples: Vec<IoSample>) {
        let mut entries = self.entries.lock();
        let mut seen = Vec::with_capacity(samples.len());

        for sample in samples {
            seen.push(sample.pid);
            match entries.get_mut(&sample.pid) {
                Some(entry) => {
                    entry.speed = sample.bytes.saturating_sub(entry.last_bytes);
                    entry.last_bytes = sample.bytes;
                }
                None => {
                    entries.insert(
                        sample.pid,
                        Entry {
                            name: sample.name,
                            exe: sample.exe,
                            last_bytes: sample.bytes,
                            speed: 0,
                        },
                    );
                }
            }
        }

        entries.retain(|pid, _| seen.contains(pid));
    }

    /// The heaviest consumers from the last period, busiest first.
    pub fn top_consumers(&self, limit: usize) -> Vec<NetUsage> {
        let entries = self.entries.lock();
        let mut rows: Vec<NetUsage> = entries
            .iter()
            .map(|(&pid, e)| NetUsage {
                pid,
                name: e.name.clone(),
                exe: e.exe.clone(),
                speed: e.speed,
            })
            .collect();
        rows.sort_by(|a, b| b.speed.cmp(&a.speed));
        rows.truncate(limit);
        rows
    }
}

/// Owns the sampler thread; stops and joins on drop.
pub struct MonitorHandle {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl MonitorHandle {
    /// Start sampling `sampler` into `monitor` every `period`.
    pub fn spawn(
        monitor: Arc<NetworkMonitor>,
        sampler: Box<dyn IoSampler>,
        period: Duration,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let thread = thread::spawn(move || {
            while !thread_stop.load(Ordering::SeqCst) {
                monitor.record(sampler.sample());
                thread::sleep(period);
            }
            debug!("network monitor stopped");
        });
        Self {
            stop,
            thread: Some(thread),
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pid: u32, bytes: u64) -> IoSample {
        IoSample {
            pid,
            name: format!("proc{}", pid),
            exe: Some(format!(r"C:\bin\proc{}.exe", pid)),
            bytes,
        }
    }

    #[test]
    fn first_sample_reports_zero_speed() {
        let monitor = NetworkMonitor::new();
        monitor.record(vec![sample(1, 5000)]);
        let top = monitor.top_consumers(10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].speed, 0);
    }

    #[test]
    fn speed_is_the_delta_between_samples() {
        let monitor = NetworkMonitor::new();
        monitor.record(vec![sample(1, 1000), sample(2, 9000)]);
        monitor.record(vec![sample(1, 1700), sample(2, 9100)]);

        let top = monitor.top_consumers(10);
        assert_eq!(top[0].pid, 1);
        assert_eq!(top[0].speed, 700);
        assert_eq!(top[1].pid, 2);
        assert_eq!(top[1].speed, 100);
    }

    #[test]
    fn dead_processes_are_dropped() {
        let monitor = NetworkMonitor::new();
        monitor.record(vec![sample(1, 100), sample(2, 100)]);
        monitor.record(vec![sample(2, 200)]);

        let top = monitor.top_consumers(10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].pid, 2);
    }

    #[test]
    fn counter_reset_does_not_underflow() {
        let monitor = NetworkMonitor::new();
        monitor.record(vec![sample(1, 5000)]);
        monitor.record(vec![sample(1, 100)]);
        assert_eq!(monitor.top_consumers(1)[0].speed, 0);
    }

    #[test]
    fn top_consumers_respects_the_limit() {
        let monitor = NetworkMonitor::new();
        let first: Vec<IoSample> = (1..=5).map(|pid| sample(pid, 0)).collect();
        let second: Vec<IoSample> = (1..=5).map(|pid| sample(pid, pid as u64 * 10)).collect();
        monitor.record(first);
        monitor.record(second);

        let top = monitor.top_consumers(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].pid, 5);
        assert_eq!(top[1].pid, 4);
    }
}
