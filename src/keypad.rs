//! Source keypad keys and their keyboard usages

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::page::Keyboard;

/// A physical key on the source keypad
///
/// Values are dense, `0..LogicalKey::COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum LogicalKey {
    Down = 0,
    Left,
    Right,
    Up,
    Enter,
    Add,
    Sub,
    Mul,
    Div,
    Power,
    Clear,
    Chs,
    Digit3,
    Digit6,
    Digit9,
    RParen,
    Tan,
    Vars,
    DecPnt,
    Digit2,
    Digit5,
    Digit8,
    LParen,
    Cos,
    Prgm,
    Stat,
    Digit0,
    Digit1,
    Digit4,
    Digit7,
    Comma,
    Sin,
    Apps,
    GraphVar,
    Store,
    Ln,
    Log,
    Square,
    Recip,
    Math,
    Alpha,
    Graph,
    Trace,
    Zoom,
    Window,
    Yequ,
    Second,
    Mode,
    Del,
}

impl LogicalKey {
    pub const COUNT: usize = LogicalKey::Del as usize + 1;
}

/// Which of the two usage tables is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    #[default]
    Normal,
    Special,
}

impl KeyMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            KeyMode::Normal => KeyMode::Special,
            KeyMode::Special => KeyMode::Normal,
        }
    }
}

/// Resolves a keypad key to its usage in the given mode.
///
/// Keys without an entry in the active table resolve to [`Keyboard::NoEventIndicated`].
pub fn lookup(key: LogicalKey, mode: KeyMode) -> Keyboard {
    match mode {
        KeyMode::Normal => normal_usage(key),
        KeyMode::Special => special_usage(key),
    }
}

/// [`lookup`] for a raw key code, out of range codes resolve to no key
pub fn lookup_code(code: u8, mode: KeyMode) -> Keyboard {
    LogicalKey::try_from(code)
        .map(|key| lookup(key, mode))
        .unwrap_or(Keyboard::NoEventIndicated)
}

fn normal_usage(key: LogicalKey) -> Keyboard {
    use LogicalKey::*;
    match key {
        Up => Keyboard::UpArrow,
        Down => Keyboard::DownArrow,
        Left => Keyboard::LeftArrow,
        Right => Keyboard::RightArrow,
        Del => Keyboard::DeleteBackspace,
        Math => Keyboard::A,
        Apps => Keyboard::B,
        Prgm => Keyboard::C,
        Recip => Keyboard::D,
        Sin => Keyboard::E,
        Cos => Keyboard::F,
        Tan => Keyboard::G,
        Power => Keyboard::H,
        Square => Keyboard::I,
        Comma => Keyboard::J,
        LParen => Keyboard::K,
        RParen => Keyboard::L,
        Div => Keyboard::M,
        Log => Keyboard::N,
        Digit7 => Keyboard::O,
        Digit8 => Keyboard::P,
        Digit9 => Keyboard::Q,
        Mul => Keyboard::R,
        Ln => Keyboard::S,
        Digit4 => Keyboard::T,
        Digit5 => Keyboard::U,
        Digit6 => Keyboard::V,
        Sub => Keyboard::W,
        Store => Keyboard::X,
        Digit1 => Keyboard::Y,
        Digit2 => Keyboard::Z,
        Digit3 => Keyboard::CapsLock,
        Add => Keyboard::Dot,
        Digit0 => Keyboard::Space,
        DecPnt => Keyboard::Semicolon,
        Chs => Keyboard::ForwardSlash,
        Enter => Keyboard::ReturnEnter,
        Stat => Keyboard::Tab,
        _ => Keyboard::NoEventIndicated,
    }
}

fn special_usage(key: LogicalKey) -> Keyboard {
    use LogicalKey::*;
    match key {
        Up => Keyboard::VolumeUp,
        Down => Keyboard::VolumeDown,
        Left => Keyboard::MediaBack,
        Right => Keyboard::MediaForward,
        Del => Keyboard::DeleteBackspace,
        Math => Keyboard::F1,
        Apps => Keyboard::F2,
        Prgm => Keyboard::F3,
        Recip => Keyboard::F4,
        Sin => Keyboard::F5,
        Cos => Keyboard::F6,
        Tan => Keyboard::F7,
        Power => Keyboard::F8,
        Square => Keyboard::Home,
        Comma => Keyboard::Comma,
        LParen => Keyboard::KeypadOpenParens,
        RParen => Keyboard::KeypadCloseParens,
        Div => Keyboard::Escape,
        Log => Keyboard::PageUp,
        Digit7 => Keyboard::Keyboard7,
        Digit8 => Keyboard::Keyboard8,
        Digit9 => Keyboard::Keyboard9,
        Mul => Keyboard::KeypadMultiply,
        Ln => Keyboard::PageDown,
        Digit4 => Keyboard::Keyboard4,
        Digit5 => Keyboard::Keyboard5,
        Digit6 => Keyboard::Keyboard6,
        Sub => Keyboard::Minus,
        Store => Keyboard::End,
        Digit1 => Keyboard::Keyboard1,
        Digit2 => Keyboard::Keyboard2,
        Digit3 => Keyboard::Keyboard3,
        Add => Keyboard::Equal,
        Digit0 => Keyboard::Keyboard0,
        DecPnt => Keyboard::Semicolon,
        Chs => Keyboard::ForwardSlash,
        Enter => Keyboard::ReturnEnter,
        Stat => Keyboard::Tab,
        Vars => Keyboard::LeftGUI,
        _ => Keyboard::NoEventIndicated,
    }
}

/// Local keypad polled once per control loop iteration
///
/// Both reads return the current key level; edge detection is up to the caller.
pub trait Keypad {
    fn cancel_pressed(&mut self) -> bool;
    fn start_pressed(&mut self) -> bool;
}

/// Turns a polled level into a single rising edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only on the poll where `level` goes from released to pressed
    pub fn rising(&mut self, level: bool) -> bool {
        let edge = level && !self.previous;
        self.previous = level;
        edge
    }
}
