//! Compiles a character script into boot keyboard reports
//!
//! Letters, digits and a fixed set of US layout punctuation type themselves. Two control
//! characters act as escape markers: [`ENTER_MARKER`] presses Enter and [`HOLD_MARKER`]
//! inserts a timed pause. Any other character compiles to an empty report, so an odd
//! script degrades to no-op keystrokes instead of failing.

use heapless::Vec;
use log::debug;

use crate::device::keyboard::{BootKeyboardReport, Modifiers};
use crate::page::Keyboard;

/// Presses Enter (ESC, `\x1b`)
pub const ENTER_MARKER: char = '\x1b';
/// Pauses playback (BEL, `\x07`)
pub const HOLD_MARKER: char = '\x07';

/// Default countdown length of a hold
pub const DEFAULT_HOLD_ITERATIONS: u16 = 50;

/// Opens the run dialog, launches notepad and types a greeting into it
pub const DEFAULT_SCRIPT: &str = "r\x07notepad\x1b\x07\x07Hello from the keypad!\x1b";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptEvent {
    Literal(char),
    SpecialEnter,
    SpecialHold,
}

impl From<char> for ScriptEvent {
    fn from(ch: char) -> Self {
        match ch {
            ENTER_MARKER => ScriptEvent::SpecialEnter,
            HOLD_MARKER => ScriptEvent::SpecialHold,
            ch => ScriptEvent::Literal(ch),
        }
    }
}

/// Playback behaviour selected by the event a frame was compiled from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Keystroke,
    Enter,
    /// No report is sent, playback pauses for `iterations` ticks
    Hold { iterations: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledFrame {
    pub report: BootKeyboardReport,
    pub kind: FrameKind,
}

impl CompiledFrame {
    pub fn is_hold(&self) -> bool {
        matches!(self.kind, FrameKind::Hold { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileError {
    /// More events than the frame buffer holds
    ScriptTooLong { capacity: usize },
}

/// Modifier and usage typing `ch` on a US layout, [`Keyboard::NoEventIndicated`] if none
pub fn keystroke_for(ch: char) -> (Modifiers, Keyboard) {
    if let Some(key) = Keyboard::letter(ch) {
        let modifiers = if ch.is_ascii_uppercase() {
            Modifiers::SHIFT
        } else {
            Modifiers::NONE
        };
        return (modifiers, key);
    }
    if let Some(key) = Keyboard::digit(ch) {
        return (Modifiers::NONE, key);
    }

    match ch {
        ' ' => (Modifiers::NONE, Keyboard::Space),
        '!' => (Modifiers::SHIFT, Keyboard::Keyboard1),
        '@' => (Modifiers::SHIFT, Keyboard::Keyboard2),
        '#' => (Modifiers::SHIFT, Keyboard::Keyboard3),
        '$' => (Modifiers::SHIFT, Keyboard::Keyboard4),
        '%' => (Modifiers::SHIFT, Keyboard::Keyboard5),
        '^' => (Modifiers::SHIFT, Keyboard::Keyboard6),
        '&' => (Modifiers::SHIFT, Keyboard::Keyboard7),
        '*' => (Modifiers::SHIFT, Keyboard::Keyboard8),
        '(' => (Modifiers::SHIFT, Keyboard::Keyboard9),
        ')' => (Modifiers::SHIFT, Keyboard::Keyboard0),
        '"' => (Modifiers::SHIFT, Keyboard::Apostrophe),
        ':' => (Modifiers::SHIFT, Keyboard::Semicolon),
        '_' => (Modifiers::SHIFT, Keyboard::Minus),
        '/' => (Modifiers::NONE, Keyboard::ForwardSlash),
        '.' => (Modifiers::NONE, Keyboard::Dot),
        '-' => (Modifiers::NONE, Keyboard::Minus),
        _ => (Modifiers::NONE, Keyboard::NoEventIndicated),
    }
}

fn compile_event(event: ScriptEvent, hold_iterations: u16) -> CompiledFrame {
    match event {
        ScriptEvent::Literal(ch) => {
            let (modifiers, key) = keystroke_for(ch);
            CompiledFrame {
                report: BootKeyboardReport::keystroke(modifiers, key),
                kind: FrameKind::Keystroke,
            }
        }
        ScriptEvent::SpecialEnter => CompiledFrame {
            report: BootKeyboardReport::keystroke(Modifiers::NONE, Keyboard::ReturnEnter),
            kind: FrameKind::Enter,
        },
        ScriptEvent::SpecialHold => CompiledFrame {
            report: BootKeyboardReport::RELEASED,
            kind: FrameKind::Hold {
                iterations: hold_iterations,
            },
        },
    }
}

/// Compiles `script` into one frame per character.
///
/// The first frame always has GUI held, which opens the run dialog on the target host.
pub fn compile<const N: usize>(
    script: &str,
    hold_iterations: u16,
) -> Result<Vec<CompiledFrame, N>, CompileError> {
    let mut frames = Vec::new();
    for ch in script.chars() {
        frames
            .push(compile_event(ScriptEvent::from(ch), hold_iterations))
            .map_err(|_| CompileError::ScriptTooLong { capacity: N })?;
    }

    if let Some(first) = frames.first_mut() {
        first.report.add_modifiers(Modifiers::GUI);
    }
    debug!("compiled {} frames", frames.len());
    Ok(frames)
}

#[cfg(test)]
mod test {
    use super::*;

    fn compiled(script: &str) -> Vec<CompiledFrame, 64> {
        compile(script, 3).unwrap()
    }

    #[test]
    fn single_capital_letter() {
        let frames = compiled("A");
        assert_eq!(frames.len(), 1);
        let report = frames[0].report;
        assert!(report.modifiers().left_shift());
        assert!(report.modifiers().left_gui());
        assert_eq!(report.keys, [Keyboard::A as u8, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn gui_only_on_first_frame() {
        let frames = compiled("a1");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].report.modifiers(), Modifiers::GUI);
        assert_eq!(frames[0].report.keys[0], Keyboard::A as u8);
        assert_eq!(frames[1].report.modifiers(), Modifiers::NONE);
        assert_eq!(frames[1].report.keys[0], Keyboard::Keyboard1 as u8);
    }

    #[test]
    fn digits() {
        let frames = compiled(" 0123456789");
        assert_eq!(frames[1].report.keys[0], Keyboard::Keyboard0 as u8);
        assert_eq!(frames[2].report.keys[0], Keyboard::Keyboard1 as u8);
        assert_eq!(frames[10].report.keys[0], Keyboard::Keyboard9 as u8);
    }

    #[test]
    fn punctuation_uses_shift_layer() {
        assert_eq!(keystroke_for('!'), (Modifiers::SHIFT, Keyboard::Keyboard1));
        assert_eq!(keystroke_for('"'), (Modifiers::SHIFT, Keyboard::Apostrophe));
        assert_eq!(keystroke_for(':'), (Modifiers::SHIFT, Keyboard::Semicolon));
        assert_eq!(keystroke_for('_'), (Modifiers::SHIFT, Keyboard::Minus));
        assert_eq!(keystroke_for('-'), (Modifiers::NONE, Keyboard::Minus));
        assert_eq!(keystroke_for('/'), (Modifiers::NONE, Keyboard::ForwardSlash));
        assert_eq!(keystroke_for(' '), (Modifiers::NONE, Keyboard::Space));
    }

    #[test]
    fn unmapped_characters_are_empty_reports() {
        let frames = compiled("a~é");
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].report, BootKeyboardReport::RELEASED);
        assert_eq!(frames[2].report, BootKeyboardReport::RELEASED);
        assert_eq!(frames[2].kind, FrameKind::Keystroke);
    }

    #[test]
    fn escape_markers() {
        let frames = compiled("x\x1b\x07");
        assert_eq!(frames[1].kind, FrameKind::Enter);
        assert_eq!(frames[1].report.keys, [Keyboard::ReturnEnter as u8, 0, 0, 0, 0, 0]);
        assert_eq!(frames[1].report.modifier, 0);
        assert_eq!(frames[2].kind, FrameKind::Hold { iterations: 3 });
        assert!(frames[2].is_hold());
        assert_eq!(frames[2].report, BootKeyboardReport::RELEASED);
    }

    #[test]
    fn script_event_from_char() {
        assert_eq!(ScriptEvent::from('q'), ScriptEvent::Literal('q'));
        assert_eq!(ScriptEvent::from(ENTER_MARKER), ScriptEvent::SpecialEnter);
        assert_eq!(ScriptEvent::from(HOLD_MARKER), ScriptEvent::SpecialHold);
    }

    #[test]
    fn empty_script() {
        assert!(compiled("").is_empty());
    }

    #[test]
    fn script_longer_than_buffer() {
        let result: Result<Vec<CompiledFrame, 2>, _> = compile("abc", 1);
        assert_eq!(result, Err(CompileError::ScriptTooLong { capacity: 2 }));
    }

    #[test]
    fn default_script_compiles() {
        let frames: Vec<CompiledFrame, 64> =
            compile(DEFAULT_SCRIPT, DEFAULT_HOLD_ITERATIONS).unwrap();
        assert_eq!(frames.len(), DEFAULT_SCRIPT.chars().count());
        assert_eq!(frames[0].report.modifiers(), Modifiers::GUI);
        assert!(frames.iter().any(|f| f.is_hold()));
    }
}
