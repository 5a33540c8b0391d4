//! Synthetic input emission
//!
//! SendInput for global replay, PostMessageW for the background clicker
//! (clicks delivered to one window without touching the cursor).

use crate::backend::InputSink;
use gm_core::{Error, ErrorCode, Key, MouseButton, Result};
use std::ffi::c_void;

use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_KEYUP, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN,
    MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEINPUT, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    PostMessageW, SetCursorPos, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP,
};

const MK_LBUTTON: usize = 0x0001;

/// Global synthetic input, indistinguishable from hardware to the OS.
pub struct SendInputSink;

impl InputSink for SendInputSink {
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        unsafe {
            SetCursorPos(x, y).map_err(|e| {
                Error::new(ErrorCode::PlaybackError, format!("SetCursorPos failed: {:?}", e))
            })?;
        }
        Ok(())
    }

    fn button(&mut self, _x: i32, _y: i32, button: MouseButton, pressed: bool) -> Result<()> {
        // The recorded move events position the cursor; the click fires
        // wherever the cursor currently sits.
        let flags = match (button, pressed) {
            (MouseButton::Left, true) => MOUSEEVENTF_LEFTDOWN,
            (MouseButton::Left, false) => MOUSEEVENTF_LEFTUP,
            (MouseButton::Right, true) => MOUSEEVENTF_RIGHTDOWN,
            (MouseButton::Right, false) => MOUSEEVENTF_RIGHTUP,
            (MouseButton::Middle, true) => MOUSEEVENTF_MIDDLEDOWN,
            (MouseButton::Middle, false) => MOUSEEVENTF_MIDDLEUP,
        };
        send_inputs(&[make_mouse_input(flags)])
    }

    fn key(&mut self, key: Key, down: bool) -> Result<()> {
        send_inputs(&[make_key_input(key.vk(), !down)])
    }
}

/// Click delivery to a specific window handle via message posting.
pub struct WindowSink {
    hwnd: isize,
}

impl WindowSink {
    pub fn new(hwnd: isize) -> Self {
        Self { hwnd }
    }

    fn post(&self, msg: u32, wparam: usize, lparam: isize) -> Result<()> {
        unsafe {
            PostMessageW(HWND(self.hwnd as *mut c_void), msg, WPARAM(wparam), LPARAM(lparam))
                .map_err(|e| {
                    Error::new(
                        ErrorCode::PlaybackError,
                        format!("PostMessage failed: {:?}", e),
                    )
                })
        }
    }
}

impl InputSink for WindowSink {
    fn move_to(&mut self, _x: i32, _y: i32) -> Result<()> {
        // Window-targeted clicks carry their own coordinates.
        Ok(())
    }

    fn button(&mut self, x: i32, y: i32, button: MouseButton, pressed: bool) -> Result<()> {
        if button != MouseButton::Left {
            return Err(Error::new(
                ErrorCode::PlaybackError,
                "window clicker only posts left clicks",
            ));
        }
        let lparam = ((y as isize) << 16) | (x as isize & 0xFFFF);
        if pressed {
            self.post(WM_LBUTTONDOWN, MK_LBUTTON, lparam)
        } else {
            self.post(WM_LBUTTONUP, 0, lparam)
        }
    }

    fn key(&mut self, key: Key, down: bool) -> Result<()> {
        let msg = if down { WM_KEYDOWN } else { WM_KEYUP };
        self.post(msg, key.vk() as usize, 0)
    }
}

// SendInput plumbing

fn make_mouse_input(
    flags: windows::Win32::UI::Input::KeyboardAndMouse::MOUSE_EVENT_FLAGS,
) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn make_key_input(vk: u16, key_up: bool) -> INPUT {
    let flags = if key_up {
        KEYEVENTF_KEYUP
    } else {
        KEYBD_EVENT_FLAGS(0)
    };

    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn send_inputs(inputs: &[INPUT]) -> Result<()> {
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };

    if sent as usize != inputs.len() {
        return Err(Error::new(
            ErrorCode::PlaybackError,
            format!("SendInput sent {} of {} inputs", sent, inputs.len()),
        ));
    }

    Ok(())
}
