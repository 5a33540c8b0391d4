//! Global recording hotkey (Ctrl+Win+R)
//!
//! Polled, not hook-based: a 100 ms scan of the async key state is cheap
//! and cannot interfere with the capture hooks. A one second pause after
//! each toggle debounces the chord.

use crate::state::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub struct HotkeyHandle {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for HotkeyHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

#[cfg(target_os = "windows")]
pub fn spawn(state: Arc<AppState>) -> HotkeyHandle {
    use tracing::{info, warn};
    use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

    const VK_CONTROL: i32 = 0x11;
    const VK_LWIN: i32 = 0x5B;
    const VK_R: i32 = 0x52;

    fn pressed(vk: i32) -> bool {
        (unsafe { GetAsyncKeyState(vk) } as u16 & 0x8000) != 0
    }

    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = stop.clone();
    let thread = thread::spawn(move || {
        info!("hotkey listener started (Ctrl+Win+R)");
        while !thread_stop.load(Ordering::SeqCst) {
            if pressed(VK_CONTROL) && pressed(VK_LWIN) && pressed(VK_R) {
                let result = if state.controller.status().recording {
                    info!("hotkey: stop recording");
                    state.controller.stop_recording().map(|_| ())
                } else {
                    info!("hotkey: start recording");
                    state.controller.start_recording()
                };
                if let Err(e) = result {
                    warn!(error = %e, "hotkey toggle failed");
                }
                thread::sleep(Duration::from_secs(1));
            }
            thread::sleep(Duration::from_millis(100));
        }
    });

    HotkeyHandle {
        stop,
        thread: Some(thread),
    }
}

#[cfg(not(target_os = "windows"))]
pub fn spawn(_state: Arc<AppState>) -> HotkeyHandle {
    HotkeyHandle {
        stop: Arc::new(AtomicBool::new(false)),
        thread: None,
    }
}
