//! End-to-end tests for the capture/replay engine over a scripted
//! backend. No OS input is touched: the listener replays a fixed script
//! and the sink records what the player emits.

use crossbeam_channel::Sender;
use gm_core::{ErrorCode, Key, MacroEvent, MacroLog, MouseButton};
use gm_macro::{InputBackend, InputListener, InputSink, MacroController, RawInput};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sends a fixed script, then idles until the stop flag flips.
struct ScriptedListener {
    script: Vec<RawInput>,
    gap: Duration,
}

impl InputListener for ScriptedListener {
    fn run(
        self: Box<Self>,
        tx: Sender<RawInput>,
        stop: Arc<AtomicBool>,
        ready: Sender<gm_core::Result<()>>,
    ) {
        let _ = ready.send(Ok(()));
        for raw in self.script {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            std::thread::sleep(self.gap);
            let _ = tx.send(raw);
        }
        while !stop.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

/// Sends the same event as fast as the channel accepts until stopped.
struct FloodListener;

impl InputListener for FloodListener {
    fn run(
        self: Box<Self>,
        tx: Sender<RawInput>,
        stop: Arc<AtomicBool>,
        ready: Sender<gm_core::Result<()>>,
    ) {
        let _ = ready.send(Ok(()));
        while !stop.load(Ordering::SeqCst) {
            let _ = tx.try_send(RawInput::Move { x: 1, y: 1 });
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Reports an observer-installation failure and exits.
struct FailingListener;

impl InputListener for FailingListener {
    fn run(
        self: Box<Self>,
        _tx: Sender<RawInput>,
        _stop: Arc<AtomicBool>,
        ready: Sender<gm_core::Result<()>>,
    ) {
        let _ = ready.send(Err(gm_core::Error::capture("hook install failed")));
    }
}

/// Dies on startup without ever signalling readiness.
struct VanishingListener;

impl InputListener for VanishingListener {
    fn run(
        self: Box<Self>,
        _tx: Sender<RawInput>,
        _stop: Arc<AtomicBool>,
        _ready: Sender<gm_core::Result<()>>,
    ) {
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    emitted: Arc<Mutex<Vec<(MacroEvent, Instant)>>>,
    emit_delay: Duration,
}

impl RecordingSink {
    fn with_delay(delay: Duration) -> Self {
        Self {
            emitted: Arc::new(Mutex::new(Vec::new())),
            emit_delay: delay,
        }
    }

    fn count(&self) -> usize {
        self.emitted.lock().len()
    }

    fn record(&self, event: MacroEvent) {
        if !self.emit_delay.is_zero() {
            std::thread::sleep(self.emit_delay);
        }
        self.emitted.lock().push((event, Instant::now()));
    }
}

impl InputSink for RecordingSink {
    fn move_to(&mut self, x: i32, y: i32) -> gm_core::Result<()> {
        self.record(MacroEvent::Move { x, y, time: 0.0 });
        Ok(())
    }

    fn button(
        &mut self,
        x: i32,
        y: i32,
        button: MouseButton,
        pressed: bool,
    ) -> gm_core::Result<()> {
        self.record(MacroEvent::Click {
            x,
            y,
            button,
            pressed,
            time: 0.0,
        });
        Ok(())
    }

    fn key(&mut self, key: Key, down: bool) -> gm_core::Result<()> {
        let event = if down {
            MacroEvent::KeyDown { key, time: 0.0 }
        } else {
            MacroEvent::KeyUp { key, time: 0.0 }
        };
        self.record(event);
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum ListenerMode {
    Scripted,
    Flood,
    FailInstall,
    Vanish,
}

struct FakeBackend {
    script: Mutex<Vec<RawInput>>,
    gap: Duration,
    mode: ListenerMode,
    sink: RecordingSink,
    window_sink: RecordingSink,
}

impl FakeBackend {
    fn new() -> Arc<Self> {
        Self::with_script(Vec::new())
    }

    fn with_script(script: Vec<RawInput>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            gap: Duration::from_millis(10),
            mode: ListenerMode::Scripted,
            sink: RecordingSink::default(),
            window_sink: RecordingSink::default(),
        })
    }

    fn with_mode(mode: ListenerMode) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Vec::new()),
            gap: Duration::ZERO,
            mode,
            sink: RecordingSink::default(),
            window_sink: RecordingSink::default(),
        })
    }

    fn flooding() -> Arc<Self> {
        Self::with_mode(ListenerMode::Flood)
    }

    fn with_sink(sink: RecordingSink) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Vec::new()),
            gap: Duration::ZERO,
            mode: ListenerMode::Scripted,
            sink,
            window_sink: RecordingSink::default(),
        })
    }
}

impl InputBackend for FakeBackend {
    fn listener(&self) -> gm_core::Result<Box<dyn InputListener>> {
        match self.mode {
            ListenerMode::Flood => Ok(Box::new(FloodListener)),
            ListenerMode::FailInstall => Ok(Box::new(FailingListener)),
            ListenerMode::Vanish => Ok(Box::new(VanishingListener)),
            ListenerMode::Scripted => Ok(Box::new(ScriptedListener {
                script: self.script.lock().clone(),
                gap: self.gap,
            })),
        }
    }

    fn synthesizer(&self) -> gm_core::Result<Box<dyn InputSink>> {
        Ok(Box::new(self.sink.clone()))
    }

    fn window_clicker(&self, _hwnd: isize) -> gm_core::Result<Box<dyn InputSink>> {
        Ok(Box::new(self.window_sink.clone()))
    }
}

fn wait_until(mut pred: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    pred()
}

fn sample_log(offsets: &[f64]) -> MacroLog {
    MacroLog::new(
        offsets
            .iter()
            .map(|&time| MacroEvent::Move { x: 10, y: 20, time })
            .collect(),
    )
}

#[test]
fn capture_stamps_events_in_order() {
    let backend = FakeBackend::with_script(vec![
        RawInput::Move { x: 5, y: 6 },
        RawInput::Button {
            x: 5,
            y: 6,
            button: MouseButton::Left,
            pressed: true,
        },
        RawInput::Key {
            key: Key::W,
            down: true,
        },
    ]);
    let controller = MacroController::new(backend);

    controller.start_recording().unwrap();
    assert!(wait_until(
        || controller.status().macro_length == 3,
        Duration::from_secs(2)
    ));
    let log = controller.stop_recording().unwrap();

    assert_eq!(log.len(), 3);
    assert!(matches!(log.events()[0], MacroEvent::Move { x: 5, y: 6, .. }));
    assert!(matches!(
        log.events()[1],
        MacroEvent::Click {
            button: MouseButton::Left,
            pressed: true,
            ..
        }
    ));
    assert!(matches!(
        log.events()[2],
        MacroEvent::KeyDown { key: Key::W, .. }
    ));

    let times: Vec<f64> = log.iter().map(|e| e.time()).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    assert!(times.iter().all(|&t| t >= 0.0));
}

#[test]
fn stop_recording_freezes_the_log() {
    let controller = MacroController::new(FakeBackend::flooding());

    controller.start_recording().unwrap();
    assert!(wait_until(
        || controller.status().macro_length > 10,
        Duration::from_secs(2)
    ));
    let log = controller.stop_recording().unwrap();

    // Whatever raced the stop flag was dropped; the returned log is the
    // final one and status keeps reporting its length.
    std::thread::sleep(Duration::from_millis(50));
    let status = controller.status();
    assert!(!status.recording);
    assert_eq!(status.macro_length, log.len());
}

#[test]
fn concurrent_recording_is_rejected() {
    let backend = FakeBackend::with_script(vec![RawInput::Move { x: 1, y: 2 }]);
    let controller = MacroController::new(backend);

    controller.start_recording().unwrap();
    assert!(wait_until(
        || controller.status().macro_length == 1,
        Duration::from_secs(2)
    ));

    let err = controller.start_recording().unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyActive);

    // The rejected call must not have reset the in-progress session.
    assert!(controller.status().recording);
    assert_eq!(controller.status().macro_length, 1);
    controller.stop_recording().unwrap();
}

#[test]
fn stop_recording_without_session_is_rejected() {
    let controller = MacroController::new(FakeBackend::new());
    let err = controller.stop_recording().unwrap_err();
    assert_eq!(err.code, ErrorCode::NotActive);
}

#[test]
fn failed_observer_install_surfaces_a_capture_error() {
    let controller = MacroController::new(FakeBackend::with_mode(ListenerMode::FailInstall));

    let err = controller.start_recording().unwrap_err();
    assert_eq!(err.code, ErrorCode::CaptureError);

    // No session was left behind.
    assert!(!controller.status().recording);
    let err = controller.stop_recording().unwrap_err();
    assert_eq!(err.code, ErrorCode::NotActive);
}

#[test]
fn listener_dying_on_startup_surfaces_a_capture_error() {
    let controller = MacroController::new(FakeBackend::with_mode(ListenerMode::Vanish));

    let err = controller.start_recording().unwrap_err();
    assert_eq!(err.code, ErrorCode::CaptureError);
    assert!(!controller.status().recording);
}

#[test]
fn next_recording_resets_the_log() {
    let backend = FakeBackend::with_script(vec![
        RawInput::Move { x: 1, y: 1 },
        RawInput::Move { x: 2, y: 2 },
    ]);
    let controller = MacroController::new(backend.clone());

    controller.start_recording().unwrap();
    assert!(wait_until(
        || controller.status().macro_length == 2,
        Duration::from_secs(2)
    ));
    controller.stop_recording().unwrap();
    assert_eq!(controller.status().macro_length, 2);

    backend.script.lock().truncate(1);
    controller.start_recording().unwrap();
    assert!(wait_until(
        || controller.status().recording && controller.status().macro_length <= 1,
        Duration::from_secs(2)
    ));
    assert!(wait_until(
        || controller.status().macro_length == 1,
        Duration::from_secs(2)
    ));
    let log = controller.stop_recording().unwrap();
    assert_eq!(log.len(), 1);
}

#[test]
fn playback_waits_are_anchored_not_cumulative() {
    // Two events 200ms apart, each emission costing 150ms. Anchored
    // timing absorbs the first emission's cost into the second wait, so
    // the run stays near the 200ms schedule instead of drifting to 350ms+.
    let sink = RecordingSink::with_delay(Duration::from_millis(150));
    let controller = MacroController::new(FakeBackend::with_sink(sink.clone()));

    let start = Instant::now();
    controller
        .play(sample_log(&[0.0, 0.2]), false, Duration::ZERO)
        .unwrap();
    assert!(wait_until(
        || !controller.status().playing,
        Duration::from_secs(2)
    ));
    let total = start.elapsed();

    assert_eq!(sink.count(), 2);
    // Lower bound: the final event never fires before its own offset.
    assert!(total >= Duration::from_millis(200), "finished at {total:?}");
    // Upper bound: under the 500ms a delta-based wait would take.
    assert!(total < Duration::from_millis(450), "finished at {total:?}");
}

#[test]
fn stop_playback_interrupts_a_long_wait() {
    let sink = RecordingSink::default();
    let controller = MacroController::new(FakeBackend::with_sink(sink.clone()));

    controller
        .play(sample_log(&[0.0, 10.0]), false, Duration::ZERO)
        .unwrap();
    assert!(wait_until(|| sink.count() == 1, Duration::from_secs(2)));

    let start = Instant::now();
    controller.stop_playback();
    assert!(wait_until(
        || !controller.status().playing,
        Duration::from_secs(2)
    ));

    // Cancelled out of a 10s suspension promptly, and the pending event
    // never fired.
    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(sink.count(), 1);
}

#[test]
fn looped_playback_repeats_until_stopped() {
    let sink = RecordingSink::default();
    let controller = MacroController::new(FakeBackend::with_sink(sink.clone()));

    controller
        .play(sample_log(&[0.0]), true, Duration::from_millis(10))
        .unwrap();
    assert!(wait_until(|| sink.count() >= 5, Duration::from_secs(2)));
    assert!(controller.status().playing);

    controller.stop_playback();
    assert!(wait_until(
        || !controller.status().playing,
        Duration::from_secs(2)
    ));
}

#[test]
fn playing_clears_after_natural_completion() {
    let controller = MacroController::new(FakeBackend::new());

    controller
        .play(sample_log(&[0.0, 0.05]), false, Duration::ZERO)
        .unwrap();
    assert!(wait_until(
        || !controller.status().playing,
        Duration::from_secs(2)
    ));

    // The session is reusable afterwards.
    controller
        .play(sample_log(&[0.0]), false, Duration::ZERO)
        .unwrap();
    assert!(wait_until(
        || !controller.status().playing,
        Duration::from_secs(2)
    ));
}

#[test]
fn empty_macro_is_rejected_before_starting() {
    let controller = MacroController::new(FakeBackend::new());
    let err = controller
        .play(MacroLog::new(Vec::new()), false, Duration::ZERO)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BadRequest);
    assert!(!controller.status().playing);
}

#[test]
fn malformed_offset_is_rejected_before_starting() {
    let controller = MacroController::new(FakeBackend::new());
    let err = controller
        .play(sample_log(&[0.0, -1.0]), false, Duration::ZERO)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidEvent);
    assert!(!controller.status().playing);
}

#[test]
fn playback_is_rejected_while_recording() {
    let controller = MacroController::new(FakeBackend::new());

    controller.start_recording().unwrap();
    let err = controller
        .play(sample_log(&[0.0]), false, Duration::ZERO)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyActive);
    controller.stop_recording().unwrap();
}

#[test]
fn recording_is_rejected_while_playing() {
    let controller = MacroController::new(FakeBackend::new());

    controller
        .play(sample_log(&[0.0, 5.0]), false, Duration::ZERO)
        .unwrap();
    assert!(wait_until(
        || controller.status().playing,
        Duration::from_secs(2)
    ));

    let err = controller.start_recording().unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyActive);
    controller.stop_playback();
}

#[test]
fn a_stop_racing_a_fresh_play_still_cancels_it() {
    let sink = RecordingSink::default();
    let controller = Arc::new(MacroController::new(FakeBackend::with_sink(sink.clone())));

    for round in 0..10 {
        let emitted_before = sink.count();
        let c = controller.clone();
        let player = std::thread::spawn(move || {
            c.play(sample_log(&[0.0, 30.0]), false, Duration::ZERO)
        });

        // Stop the moment the first event lands, which can be before
        // play() has returned to its caller. The stop must land on this
        // run's token, never a stale one.
        assert!(wait_until(
            || sink.count() > emitted_before,
            Duration::from_secs(2)
        ));
        controller.stop_playback();
        player.join().unwrap().unwrap();
        assert!(
            wait_until(|| !controller.status().playing, Duration::from_secs(1)),
            "stop missed the run in round {round}"
        );
    }
}

#[test]
fn stop_playback_is_idempotent() {
    let controller = MacroController::new(FakeBackend::new());
    controller.stop_playback();
    controller.stop_playback();
    assert!(!controller.status().playing);
}

#[test]
fn clicker_posts_press_release_pairs() {
    let backend = FakeBackend::new();
    let controller = MacroController::new(backend.clone());

    controller
        .start_clicker(0x1234, Duration::from_millis(10))
        .unwrap();
    assert!(wait_until(
        || backend.window_sink.count() >= 4,
        Duration::from_secs(2)
    ));
    controller.stop_playback();
    assert!(wait_until(
        || !controller.status().playing,
        Duration::from_secs(2)
    ));

    let emitted = backend.window_sink.emitted.lock();
    for pair in emitted.chunks_exact(2) {
        assert!(matches!(
            pair[0].0,
            MacroEvent::Click {
                x: 100,
                y: 100,
                button: MouseButton::Left,
                pressed: true,
                ..
            }
        ));
        assert!(matches!(
            pair[1].0,
            MacroEvent::Click {
                pressed: false, ..
            }
        ));
        // Release trails the press by the hold interval.
        let held = pair[1].1.duration_since(pair[0].1);
        assert!(held >= Duration::from_millis(40), "held {held:?}");
    }
}

#[test]
fn clicker_is_rejected_while_recording() {
    let controller = MacroController::new(FakeBackend::new());
    controller.start_recording().unwrap();
    let err = controller
        .start_clicker(1, Duration::from_millis(10))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyActive);
    controller.stop_recording().unwrap();
}
