//! Macro replay
//!
//! Timing reconstruction is anchored: each event waits until its own
//! offset from a single playback-start instant, never by the delta to the
//! previous event. Slow emissions therefore eat into the following wait
//! instead of pushing the whole schedule later.
//!
//! Every wait goes through the cancel token, so stop-playback interrupts
//! a multi-second suspension immediately rather than at the next event
//! boundary.

use crate::backend::InputSink;
use gm_core::{CancelToken, Error, MacroEvent, MacroLog, Result};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PlayOptions {
    /// Restart from the top after the final event.
    pub loop_playback: bool,
    /// Pause between repetitions when looping.
    pub interval: Duration,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            loop_playback: false,
            interval: Duration::ZERO,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlayStats {
    pub emitted: usize,
    /// Emissions that failed and were skipped.
    pub failures: usize,
    /// Full passes over the log, including the one in progress when
    /// cancelled.
    pub repetitions: usize,
}

pub struct Player;

impl Player {
    /// Replay `log` against `sink` until the log is exhausted (and
    /// looping is off) or `cancel` fires.
    ///
    /// A failed emission is logged and skipped — one bad synthetic call
    /// must not abort a timed sequence. A malformed offset aborts with
    /// `InvalidEvent`.
    pub fn play(
        log: &MacroLog,
        opts: &PlayOptions,
        sink: &mut dyn InputSink,
        cancel: &CancelToken,
    ) -> Result<PlayStats> {
        let mut stats = PlayStats::default();

        'run: loop {
            let anchor = Instant::now();
            stats.repetitions += 1;

            for event in log {
                if cancel.is_cancelled() {
                    break 'run;
                }

                let target = event.offset()?;
                let elapsed = anchor.elapsed();
                if target > elapsed && cancel.wait_for(target - elapsed) {
                    break 'run;
                }
                if cancel.is_cancelled() {
                    break 'run;
                }

                match emit(sink, event) {
                    Ok(()) => stats.emitted += 1,
                    Err(e) => {
                        warn!(error = %e, "synthetic input failed, skipping event");
                        stats.failures += 1;
                    }
                }
            }

            if !opts.loop_playback || cancel.is_cancelled() {
                break;
            }
            if !opts.interval.is_zero() && cancel.wait_for(opts.interval) {
                break;
            }
        }

        debug!(
            emitted = stats.emitted,
            failures = stats.failures,
            repetitions = stats.repetitions,
            "playback finished"
        );
        Ok(stats)
    }

    /// Reject a log the run loop could not replay, so callers can fail
    /// the request before spawning a playback thread.
    pub fn validate(log: &MacroLog) -> Result<()> {
        if log.is_empty() {
            return Err(Error::bad_request("macro is empty"));
        }
        for event in log {
            event.offset()?;
        }
        Ok(())
    }
}

fn emit(sink: &mut dyn InputSink, event: &MacroEvent) -> Result<()> {
    match *event {
        MacroEvent::Move { x, y, .. } => sink.move_to(x, y),
        MacroEvent::Click {
            x,
            y,
            button,
            pressed,
            ..
        } => sink.button(x, y, button, pressed),
        MacroEvent::KeyDown { key, .. } => sink.key(key, true),
        MacroEvent::KeyUp { key, .. } => sink.key(key, false),
    }
}
