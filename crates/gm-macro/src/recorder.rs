//! Event capture
//!
//! Two threads per session: the platform listener pushing raw events into
//! a bounded channel, and a collector stamping offsets against the session
//! anchor and appending to the shared live log. The collector checks the
//! stop flag before every append, so events that arrive after
//! stop-recording are dropped rather than corrupting the finished log.
//! `CaptureHandle::stop` joins both threads before the log is read, which
//! is the strong variant of the stop/append race tolerance.

use crate::backend::{InputListener, RawInput};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use gm_core::{ActivityGuard, Error, MacroEvent, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Bound on in-flight events between listener and collector.
    pub channel_capacity: usize,
    /// Collector wake-up interval; the upper bound on how long a stop
    /// request waits for the collector to notice.
    pub drain_interval: Duration,
    /// How long the listener gets to install its observers before the
    /// session is abandoned as a failed capture.
    pub ready_timeout: Duration,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 4096,
            drain_interval: Duration::from_millis(20),
            ready_timeout: Duration::from_secs(2),
        }
    }
}

/// Owns a live capture session.
pub struct CaptureHandle {
    stop: Arc<AtomicBool>,
    threads: Vec<thread::JoinHandle<()>>,
}

impl CaptureHandle {
    /// Flip the stop flag and join listener and collector. After this
    /// returns the log is final; late events were dropped, not appended.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        for t in self.threads.drain(..) {
            let _ = t.join();
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        // Idempotent teardown: a handle dropped without stop() must not
        // leak the listener.
        self.stop.store(true, Ordering::SeqCst);
        for t in self.threads.drain(..) {
            let _ = t.join();
        }
    }
}

pub struct Recorder {
    config: RecorderConfig,
}

impl Recorder {
    pub fn new() -> Self {
        Self::with_config(RecorderConfig::default())
    }

    pub fn with_config(config: RecorderConfig) -> Self {
        Self { config }
    }

    /// Begin capturing into `log`. The log is cleared, the listener
    /// spawned, and its readiness signal awaited before the anchor is
    /// taken and the collector spawned; capture then proceeds
    /// concurrently. A listener that reports an install failure (or dies
    /// without reporting) surfaces as `CaptureError` with no session left
    /// behind. `guard` travels into the collector so the recording state
    /// clears even if the collector faults.
    pub fn start(
        &self,
        listener: Box<dyn InputListener>,
        log: Arc<Mutex<Vec<MacroEvent>>>,
        guard: ActivityGuard,
    ) -> Result<CaptureHandle> {
        log.lock().clear();

        let (tx, rx) = bounded::<RawInput>(self.config.channel_capacity);
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);
        let stop = Arc::new(AtomicBool::new(false));

        let mut threads = Vec::with_capacity(2);

        let listener_stop = stop.clone();
        threads.push(thread::spawn(move || {
            listener.run(tx, listener_stop, ready_tx);
        }));

        let install = match ready_rx.recv_timeout(self.config.ready_timeout) {
            Ok(result) => result,
            // Disconnected: the listener returned without signalling.
            Err(_) => Err(Error::capture("input listener did not come up")),
        };
        if let Err(e) = install {
            stop.store(true, Ordering::SeqCst);
            for t in threads.drain(..) {
                let _ = t.join();
            }
            return Err(Error::capture(e.message));
        }

        let anchor = Instant::now();
        let collector_stop = stop.clone();
        let drain_interval = self.config.drain_interval;
        threads.push(thread::spawn(move || {
            let _guard = guard;
            collect(rx, collector_stop, anchor, log, drain_interval);
        }));

        Ok(CaptureHandle { stop, threads })
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

fn collect(
    rx: Receiver<RawInput>,
    stop: Arc<AtomicBool>,
    anchor: Instant,
    log: Arc<Mutex<Vec<MacroEvent>>>,
    drain_interval: Duration,
) {
    let mut appended = 0usize;
    while !stop.load(Ordering::SeqCst) {
        match rx.recv_timeout(drain_interval) {
            Ok(raw) => {
                // Re-check after the blocking recv so an event racing the
                // stop flag is dropped, not appended.
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                let time = anchor.elapsed().as_secs_f64();
                log.lock().push(raw.stamp(time));
                appended += 1;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!(events = appended, "capture collector finished");
}
