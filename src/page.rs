//! Keyboard/Keypad usage page (0x07)
//!
//! Only the usages reachable from the keypad tables and the script compiler are listed.
//! `MediaBack` and `MediaForward` are the vendor range codes understood by Linux hosts.

use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Keyboard {
    NoEventIndicated = 0x00,
    ErrorRollOver = 0x01,
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,
    Keyboard1 = 0x1E,
    Keyboard2 = 0x1F,
    Keyboard3 = 0x20,
    Keyboard4 = 0x21,
    Keyboard5 = 0x22,
    Keyboard6 = 0x23,
    Keyboard7 = 0x24,
    Keyboard8 = 0x25,
    Keyboard9 = 0x26,
    Keyboard0 = 0x27,
    ReturnEnter = 0x28,
    Escape = 0x29,
    DeleteBackspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    Semicolon = 0x33,
    Apostrophe = 0x34,
    Comma = 0x36,
    Dot = 0x37,
    ForwardSlash = 0x38,
    CapsLock = 0x39,
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    Home = 0x4A,
    PageUp = 0x4B,
    End = 0x4D,
    PageDown = 0x4E,
    RightArrow = 0x4F,
    LeftArrow = 0x50,
    DownArrow = 0x51,
    UpArrow = 0x52,
    KeypadMultiply = 0x55,
    VolumeUp = 0x80,
    VolumeDown = 0x81,
    KeypadOpenParens = 0xB6,
    KeypadCloseParens = 0xB7,
    LeftControl = 0xE0,
    LeftShift = 0xE1,
    LeftAlt = 0xE2,
    LeftGUI = 0xE3,
    RightControl = 0xE4,
    RightShift = 0xE5,
    RightAlt = 0xE6,
    RightGUI = 0xE7,
    MediaBack = 0xF1,
    MediaForward = 0xF2,
}

impl Keyboard {
    /// Letter usage for `a..=z` / `A..=Z`
    pub fn letter(ch: char) -> Option<Self> {
        let offset = match ch {
            'a'..='z' => ch as u8 - b'a',
            'A'..='Z' => ch as u8 - b'A',
            _ => return None,
        };
        Self::try_from(Keyboard::A as u8 + offset).ok()
    }

    /// Top row digit usage for `0..=9`
    pub fn digit(ch: char) -> Option<Self> {
        match ch {
            '0' => Some(Keyboard::Keyboard0),
            '1'..='9' => Self::try_from(Keyboard::Keyboard1 as u8 + (ch as u8 - b'1')).ok(),
            _ => None,
        }
    }

    pub fn is_modifier(self) -> bool {
        (Keyboard::LeftControl..=Keyboard::RightGUI).contains(&self)
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Keyboard::NoEventIndicated
    }
}
