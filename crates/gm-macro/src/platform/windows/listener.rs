//! Low-level hook listener
//!
//! Installs WH_MOUSE_LL and WH_KEYBOARD_LL on the listener thread and
//! pumps messages until the stop flag flips. Hook procedures get no user
//! pointer, so the sender lives in a process-wide slot; only one capture
//! session exists at a time, which the session state machine guarantees.

use crate::backend::{InputListener, RawInput};
use crossbeam_channel::Sender;
use gm_core::{Error, Key, MouseButton, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, PeekMessageW, SetWindowsHookExW, TranslateMessage,
    UnhookWindowsHookEx, KBDLLHOOKSTRUCT, MSG, MSLLHOOKSTRUCT, PM_REMOVE, WH_KEYBOARD_LL,
    WH_MOUSE_LL, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN,
    WM_MBUTTONUP, WM_MOUSEMOVE, WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

static HOOK_TX: Mutex<Option<Sender<RawInput>>> = Mutex::new(None);

pub struct HookListener;

impl HookListener {
    pub fn new() -> Self {
        Self
    }
}

impl InputListener for HookListener {
    fn run(
        self: Box<Self>,
        tx: Sender<RawInput>,
        stop: Arc<AtomicBool>,
        ready: Sender<Result<()>>,
    ) {
        *HOOK_TX.lock() = Some(tx);

        let mouse_hook = unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_proc), None, 0) };
        let key_hook = unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_proc), None, 0) };

        let (mouse_hook, key_hook) = match (mouse_hook, key_hook) {
            (Ok(m), Ok(k)) => (m, k),
            (m, k) => {
                error!("failed to install input hooks");
                if let Ok(h) = m {
                    unsafe { let _ = UnhookWindowsHookEx(h); }
                }
                if let Ok(h) = k {
                    unsafe { let _ = UnhookWindowsHookEx(h); }
                }
                *HOOK_TX.lock() = None;
                let _ = ready.send(Err(Error::capture("failed to install input hooks")));
                return;
            }
        };

        let _ = ready.send(Ok(()));

        // Low-level hooks are delivered through this thread's message
        // queue; pump it until stop.
        while !stop.load(Ordering::SeqCst) {
            unsafe {
                let mut msg = MSG::default();
                while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        unsafe {
            let _ = UnhookWindowsHookEx(mouse_hook);
            let _ = UnhookWindowsHookEx(key_hook);
        }
        *HOOK_TX.lock() = None;
    }
}

fn forward(raw: RawInput) {
    if let Some(tx) = &*HOOK_TX.lock() {
        // try_send: a full buffer drops the event instead of stalling the
        // system-wide input hook chain.
        let _ = tx.try_send(raw);
    }
}

unsafe extern "system" fn mouse_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 {
        let info = &*(lparam.0 as *const MSLLHOOKSTRUCT);
        let x = info.pt.x;
        let y = info.pt.y;
        let raw = match wparam.0 as u32 {
            WM_MOUSEMOVE => Some(RawInput::Move { x, y }),
            WM_LBUTTONDOWN => Some(button(x, y, MouseButton::Left, true)),
            WM_LBUTTONUP => Some(button(x, y, MouseButton::Left, false)),
            WM_RBUTTONDOWN => Some(button(x, y, MouseButton::Right, true)),
            WM_RBUTTONUP => Some(button(x, y, MouseButton::Right, false)),
            WM_MBUTTONDOWN => Some(button(x, y, MouseButton::Middle, true)),
            WM_MBUTTONUP => Some(button(x, y, MouseButton::Middle, false)),
            _ => None,
        };
        if let Some(raw) = raw {
            forward(raw);
        }
    }
    CallNextHookEx(None, code, wparam, lparam)
}

fn button(x: i32, y: i32, button: MouseButton, pressed: bool) -> RawInput {
    RawInput::Button {
        x,
        y,
        button,
        pressed,
    }
}

unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 {
        let info = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
        let down = matches!(wparam.0 as u32, WM_KEYDOWN | WM_SYSKEYDOWN);
        let up = matches!(wparam.0 as u32, WM_KEYUP | WM_SYSKEYUP);
        if down || up {
            // Keys outside the closed set are dropped so every recorded
            // log replays exactly.
            if let Some(key) = Key::from_vk(info.vkCode as u16) {
                forward(RawInput::Key { key, down });
            }
        }
    }
    CallNextHookEx(None, code, wparam, lparam)
}
