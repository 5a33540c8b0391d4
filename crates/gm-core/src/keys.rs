//! Closed key and button enumerations
//!
//! The capture and replay sides must agree on symbolic names exactly, so
//! keys are a fixed set rather than free-form strings. Anything the OS
//! reports outside this set is dropped at the capture boundary.

use serde::{Deserialize, Serialize};

/// Mouse buttons recognised by the macro engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Symbolic key identifiers.
///
/// Serialized as lowercase snake_case strings (`"a"`, `"page_down"`, ...),
/// which is the wire contract for key_down/key_up events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    #[serde(rename = "0")]
    Num0,
    #[serde(rename = "1")]
    Num1,
    #[serde(rename = "2")]
    Num2,
    #[serde(rename = "3")]
    Num3,
    #[serde(rename = "4")]
    Num4,
    #[serde(rename = "5")]
    Num5,
    #[serde(rename = "6")]
    Num6,
    #[serde(rename = "7")]
    Num7,
    #[serde(rename = "8")]
    Num8,
    #[serde(rename = "9")]
    Num9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Space,
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    Shift,
    RightShift,
    Ctrl,
    Alt,
    Win,
    CapsLock,
    Comma,
    Period,
    Slash,
    Backslash,
    Semicolon,
    Quote,
    Minus,
    Equals,
    LeftBracket,
    RightBracket,
    Grave,
}

impl Key {
    /// Windows virtual-key code for synthetic emission.
    pub fn vk(self) -> u16 {
        use Key::*;
        match self {
            A => 0x41, B => 0x42, C => 0x43, D => 0x44, E => 0x45, F => 0x46,
            G => 0x47, H => 0x48, I => 0x49, J => 0x4A, K => 0x4B, L => 0x4C,
            M => 0x4D, N => 0x4E, O => 0x4F, P => 0x50, Q => 0x51, R => 0x52,
            S => 0x53, T => 0x54, U => 0x55, V => 0x56, W => 0x57, X => 0x58,
            Y => 0x59, Z => 0x5A,
            Num0 => 0x30, Num1 => 0x31, Num2 => 0x32, Num3 => 0x33, Num4 => 0x34,
            Num5 => 0x35, Num6 => 0x36, Num7 => 0x37, Num8 => 0x38, Num9 => 0x39,
            F1 => 0x70, F2 => 0x71, F3 => 0x72, F4 => 0x73, F5 => 0x74, F6 => 0x75,
            F7 => 0x76, F8 => 0x77, F9 => 0x78, F10 => 0x79, F11 => 0x7A, F12 => 0x7B,
            Space => 0x20,
            Enter => 0x0D,
            Tab => 0x09,
            Escape => 0x1B,
            Backspace => 0x08,
            Delete => 0x2E,
            Insert => 0x2D,
            Home => 0x24,
            End => 0x23,
            PageUp => 0x21,
            PageDown => 0x22,
            Up => 0x26,
            Down => 0x28,
            Left => 0x25,
            Right => 0x27,
            Shift => 0x10,
            RightShift => 0xA1,
            Ctrl => 0x11,
            Alt => 0x12,
            Win => 0x5B,
            CapsLock => 0x14,
            Comma => 0xBC,
            Period => 0xBE,
            Slash => 0xBF,
            Backslash => 0xDC,
            Semicolon => 0xBA,
            Quote => 0xDE,
            Minus => 0xBD,
            Equals => 0xBB,
            LeftBracket => 0xDB,
            RightBracket => 0xDD,
            Grave => 0xC0,
        }
    }

    /// Map a Windows virtual-key code back into the closed set.
    ///
    /// Left/right modifier variants collapse onto the generic key, except
    /// right shift which the remap profiles reference explicitly. Keys
    /// outside the set return None and are dropped by the recorder.
    pub fn from_vk(vk: u16) -> Option<Key> {
        use Key::*;
        Some(match vk {
            0x41 => A, 0x42 => B, 0x43 => C, 0x44 => D, 0x45 => E, 0x46 => F,
            0x47 => G, 0x48 => H, 0x49 => I, 0x4A => J, 0x4B => K, 0x4C => L,
            0x4D => M, 0x4E => N, 0x4F => O, 0x50 => P, 0x51 => Q, 0x52 => R,
            0x53 => S, 0x54 => T, 0x55 => U, 0x56 => V, 0x57 => W, 0x58 => X,
            0x59 => Y, 0x5A => Z,
            0x30 => Num0, 0x31 => Num1, 0x32 => Num2, 0x33 => Num3, 0x34 => Num4,
            0x35 => Num5, 0x36 => Num6, 0x37 => Num7, 0x38 => Num8, 0x39 => Num9,
            0x70 => F1, 0x71 => F2, 0x72 => F3, 0x73 => F4, 0x74 => F5, 0x75 => F6,
            0x76 => F7, 0x77 => F8, 0x78 => F9, 0x79 => F10, 0x7A => F11, 0x7B => F12,
            0x20 => Space,
            0x0D => Enter,
            0x09 => Tab,
            0x1B => Escape,
            0x08 => Backspace,
            0x2E => Delete,
            0x2D => Insert,
            0x24 => Home,
            0x23 => End,
            0x21 => PageUp,
            0x22 => PageDown,
            0x26 => Up,
            0x28 => Down,
            0x25 => Left,
            0x27 => Right,
            0x10 | 0xA0 => Shift,
            0xA1 => RightShift,
            0x11 | 0xA2 | 0xA3 => Ctrl,
            0x12 | 0xA4 | 0xA5 => Alt,
            0x5B | 0x5C => Win,
            0x14 => CapsLock,
            0xBC => Comma,
            0xBE => Period,
            0xBF => Slash,
            0xDC => Backslash,
            0xBA => Semicolon,
            0xDE => Quote,
            0xBD => Minus,
            0xBB => Equals,
            0xDB => LeftBracket,
            0xDD => RightBracket,
            0xC0 => Grave,
            _ => return None,
        })
    }
}
