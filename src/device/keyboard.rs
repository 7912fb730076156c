//!HID boot keyboard reports and the keypad encoder

use bitfield::bitfield;
use log::{debug, warn};
use serde::Serialize;
use usbd_hid::descriptor::{AsInputReport, SerializedDescriptor};

use crate::keypad::{lookup, KeyMode, LogicalKey};
use crate::page::Keyboard;

/// Size in bytes of a boot keyboard input report on the wire
pub const REPORT_LEN: usize = 8;

/// Report descriptor served to the host: modifier byte, reserved byte,
/// 5 LED outputs and a 6 key usage array (63 bytes)
#[rustfmt::skip]
pub const BOOT_KEYBOARD_REPORT_DESCRIPTOR: &[u8; 63] = &[
    0x05, 0x01,         // Usage Page (Generic Desktop),
    0x09, 0x06,         // Usage (Keyboard),
    0xA1, 0x01,         // Collection (Application),
    0x05, 0x07,         //     Usage Page (Key Codes),
    0x19, 0xE0,         //     Usage Minimum (224),
    0x29, 0xE7,         //     Usage Maximum (231),
    0x15, 0x00,         //     Logical Minimum (0),
    0x25, 0x01,         //     Logical Maximum (1),
    0x75, 0x01,         //     Report Size (1),
    0x95, 0x08,         //     Report Count (8),
    0x81, 0x02,         //     Input (Data, Variable, Absolute), ;Modifier byte
    0x95, 0x01,         //     Report Count (1),
    0x75, 0x08,         //     Report Size (8),
    0x81, 0x03,         //     Input (Constant, Variable, Absolute), ;Reserved byte
    0x95, 0x05,         //     Report Count (5),
    0x75, 0x01,         //     Report Size (1),
    0x05, 0x08,         //     Usage Page (LEDs),
    0x19, 0x01,         //     Usage Minimum (Num Lock),
    0x29, 0x05,         //     Usage Maximum (Kana),
    0x91, 0x02,         //     Output (Data, Variable, Absolute), ;LED report
    0x95, 0x01,         //     Report Count (1),
    0x75, 0x03,         //     Report Size (3),
    0x91, 0x03,         //     Output (Constant, Variable, Absolute), ;LED report padding
    0x95, 0x06,         //     Report Count (6),
    0x75, 0x08,         //     Report Size (8),
    0x15, 0x00,         //     Logical Minimum (0),
    0x25, 0x65,         //     Logical Maximum (101),
    0x05, 0x07,         //     Usage Page (Key Codes),
    0x19, 0x00,         //     Usage Minimum (0),
    0x29, 0x65,         //     Usage Maximum (101),
    0x81, 0x00,         //     Input (Data, Array, Absolute), ;Key array
    0xC0,               // End Collection
];

bitfield! {
    /// Modifier byte of a boot keyboard report
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Modifiers(u8);
    impl Debug;
    pub left_ctrl, set_left_ctrl: 0;
    pub left_shift, set_left_shift: 1;
    pub left_alt, set_left_alt: 2;
    pub left_gui, set_left_gui: 3;
    pub right_ctrl, set_right_ctrl: 4;
    pub right_shift, set_right_shift: 5;
    pub right_alt, set_right_alt: 6;
    pub right_gui, set_right_gui: 7;
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(1 << 0);
    pub const SHIFT: Modifiers = Modifiers(1 << 1);
    pub const ALT: Modifiers = Modifiers(1 << 2);
    pub const GUI: Modifiers = Modifiers(1 << 3);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

/// A 7th simultaneous non-modifier key was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverError;

/// Report implementing the HID boot keyboard specification
///
/// Usage slots are packed from the left, unused slots hold [`Keyboard::NoEventIndicated`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct BootKeyboardReport {
    pub modifier: u8,
    pub reserved: u8,
    pub keys: [u8; 6],
}

impl SerializedDescriptor for BootKeyboardReport {
    fn desc() -> &'static [u8] {
        BOOT_KEYBOARD_REPORT_DESCRIPTOR
    }
}

impl AsInputReport for BootKeyboardReport {}

impl BootKeyboardReport {
    /// All keys released
    pub const RELEASED: BootKeyboardReport = BootKeyboardReport {
        modifier: 0,
        reserved: 0,
        keys: [0; 6],
    };

    /// Single keystroke with the given modifiers held
    pub fn keystroke(modifiers: Modifiers, key: Keyboard) -> Self {
        Self {
            modifier: modifiers.bits(),
            keys: [key.into(), 0, 0, 0, 0, 0],
            ..Self::default()
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers(self.modifier)
    }

    pub fn add_modifiers(&mut self, modifiers: Modifiers) {
        self.modifier |= modifiers.bits();
    }

    /// Number of occupied usage slots
    pub fn key_count(&self) -> usize {
        self.keys.iter().take_while(|&&k| k != 0).count()
    }

    /// Writes `key` into the first free usage slot.
    ///
    /// Returns [`RolloverError`] and leaves the report untouched when all six slots are taken.
    pub fn press(&mut self, key: Keyboard) -> Result<(), RolloverError> {
        match self.keys.iter_mut().find(|k| **k == 0) {
            Some(slot) => {
                *slot = key.into();
                Ok(())
            }
            None => Err(RolloverError),
        }
    }

    /// Wire layout: modifier, reserved, six usages
    pub fn to_bytes(&self) -> [u8; REPORT_LEN] {
        let mut data = [0; REPORT_LEN];
        data[0] = self.modifier;
        data[1] = self.reserved;
        data[2..].copy_from_slice(&self.keys);
        data
    }
}

/// Folds keypad key events into boot keyboard reports
///
/// The active [`KeyMode`] is session state: it is flipped by [`LogicalKey::Mode`] and
/// persists across calls until flipped again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeypadEncoder {
    mode: KeyMode,
}

impl KeypadEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    pub fn special_mode(&self) -> bool {
        self.mode == KeyMode::Special
    }

    pub fn encode(
        &mut self,
        key: LogicalKey,
        report: &mut BootKeyboardReport,
    ) -> Result<(), RolloverError> {
        match key {
            LogicalKey::Second => {
                report.add_modifiers(Modifiers::SHIFT);
                return Ok(());
            }
            LogicalKey::Alpha => {
                report.add_modifiers(Modifiers::CTRL);
                return Ok(());
            }
            LogicalKey::GraphVar => {
                report.add_modifiers(Modifiers::ALT);
                return Ok(());
            }
            LogicalKey::Mode => {
                self.mode = self.mode.toggled();
                debug!("keypad mode {:?}", self.mode);
                return Ok(());
            }
            _ => {}
        }

        // every other key needs a free slot, even when its usage is "no key"
        if report.key_count() == report.keys.len() {
            return Err(RolloverError);
        }

        // GUI also goes through the usage table, the special layer reports it as a key
        if key == LogicalKey::Vars {
            report.add_modifiers(Modifiers::GUI);
        }

        match lookup(key, self.mode) {
            Keyboard::NoEventIndicated => Ok(()),
            usage => report.press(usage),
        }
    }

    /// Encodes a whole chord into one report, keys beyond the sixth are dropped
    pub fn chord<K: IntoIterator<Item = LogicalKey>>(&mut self, keys: K) -> BootKeyboardReport {
        let mut report = BootKeyboardReport::default();
        for key in keys {
            if self.encode(key, &mut report).is_err() {
                warn!("rollover, dropping {:?}", key);
            }
        }
        report
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ssmarshal::serialize;
    use LogicalKey::*;

    #[test]
    fn boot_keyboard_report_ser() {
        let report = BootKeyboardReport {
            modifier: 0b0000_1010,
            reserved: 0,
            keys: [Keyboard::A as u8, Keyboard::B as u8, Keyboard::C as u8, 0, 0, 0],
        };
        let mut buf = [0u8; REPORT_LEN];
        let size = serialize(&mut buf, &report).unwrap();
        assert_eq!(size, REPORT_LEN);
        assert_eq!(&buf[..size], &[0b0000_1010, 0, 4, 5, 6, 0, 0, 0]);
        assert_eq!(report.to_bytes(), buf);
    }

    #[test]
    fn boot_keyboard_report_descriptor() {
        assert_eq!(BootKeyboardReport::desc().len(), 63);
        assert_eq!(&BootKeyboardReport::desc()[..6], &[0x05, 0x01, 0x09, 0x06, 0xA1, 0x01]);
        assert_eq!(BootKeyboardReport::desc()[62], 0xC0);
    }

    #[test]
    fn modifier_bits() {
        let mods = Modifiers::SHIFT | Modifiers::GUI;
        assert!(mods.left_shift());
        assert!(mods.left_gui());
        assert!(!mods.left_ctrl());
        assert!(mods.contains(Modifiers::GUI));
        assert_eq!(mods.bits(), 0b0000_1010);
    }

    #[test]
    fn keys_fill_left_to_right() {
        let mut encoder = KeypadEncoder::new();
        let mut report = BootKeyboardReport::default();
        let keys = [Math, Apps, Prgm, Recip, Sin, Cos];
        for (n, key) in keys.iter().enumerate() {
            assert_eq!(encoder.encode(*key, &mut report), Ok(()));
            assert_eq!(report.key_count(), n + 1);
        }
        assert_eq!(
            report.keys,
            [
                Keyboard::A as u8,
                Keyboard::B as u8,
                Keyboard::C as u8,
                Keyboard::D as u8,
                Keyboard::E as u8,
                Keyboard::F as u8
            ]
        );
    }

    #[test]
    fn partial_report_is_zero_padded() {
        let mut encoder = KeypadEncoder::new();
        let mut report = BootKeyboardReport::default();
        encoder.encode(Tan, &mut report).unwrap();
        encoder.encode(Power, &mut report).unwrap();
        assert_eq!(report.to_bytes(), [0, 0, Keyboard::G as u8, Keyboard::H as u8, 0, 0, 0, 0]);
    }

    #[test]
    fn seventh_key_rolls_over() {
        let mut encoder = KeypadEncoder::new();
        let mut report = BootKeyboardReport::default();
        for key in [Math, Apps, Prgm, Recip, Sin, Cos] {
            encoder.encode(key, &mut report).unwrap();
        }
        let before = report;
        assert_eq!(encoder.encode(Tan, &mut report), Err(RolloverError));
        assert_eq!(report, before);
    }

    #[test]
    fn keys_without_usage_roll_over_when_full() {
        let mut encoder = KeypadEncoder::new();
        let mut report = BootKeyboardReport::default();
        for key in [Math, Apps, Prgm, Recip, Sin, Cos] {
            encoder.encode(key, &mut report).unwrap();
        }
        let before = report;
        assert_eq!(encoder.encode(Clear, &mut report), Err(RolloverError));
        assert_eq!(encoder.encode(Vars, &mut report), Err(RolloverError));
        assert_eq!(report, before);
        assert!(!report.modifiers().left_gui());
    }

    #[test]
    fn keys_without_usage_take_no_slot() {
        let mut encoder = KeypadEncoder::new();
        let mut report = BootKeyboardReport::default();
        for key in [Math, Apps, Prgm, Recip, Sin] {
            encoder.encode(key, &mut report).unwrap();
        }
        assert_eq!(encoder.encode(Clear, &mut report), Ok(()));
        assert_eq!(encoder.encode(Vars, &mut report), Ok(()));
        assert_eq!(report.key_count(), 5);
        assert_eq!(encoder.encode(Cos, &mut report), Ok(()));
        assert_eq!(report.key_count(), 6);
    }

    #[test]
    fn modifiers_do_not_use_slots() {
        let mut encoder = KeypadEncoder::new();
        let mut report = BootKeyboardReport::default();
        encoder.encode(Second, &mut report).unwrap();
        encoder.encode(Alpha, &mut report).unwrap();
        encoder.encode(GraphVar, &mut report).unwrap();
        assert_eq!(report.modifiers(), Modifiers::SHIFT | Modifiers::CTRL | Modifiers::ALT);
        assert_eq!(report.key_count(), 0);
    }

    #[test]
    fn modifiers_still_apply_when_slots_are_full() {
        let mut encoder = KeypadEncoder::new();
        let mut report = BootKeyboardReport::default();
        for key in [Math, Apps, Prgm, Recip, Sin, Cos] {
            encoder.encode(key, &mut report).unwrap();
        }
        assert_eq!(encoder.encode(Second, &mut report), Ok(()));
        assert!(report.modifiers().left_shift());
    }

    #[test]
    fn gui_sets_bit_and_key_in_special_mode() {
        let mut encoder = KeypadEncoder::new();
        let mut report = BootKeyboardReport::default();
        encoder.encode(Mode, &mut report).unwrap();
        encoder.encode(Vars, &mut report).unwrap();
        assert!(report.modifiers().left_gui());
        assert_eq!(report.keys[0], Keyboard::LeftGUI as u8);
    }

    #[test]
    fn gui_in_normal_mode_sets_only_the_bit() {
        let mut encoder = KeypadEncoder::new();
        let mut report = BootKeyboardReport::default();
        encoder.encode(Vars, &mut report).unwrap();
        assert!(report.modifiers().left_gui());
        assert_eq!(report.key_count(), 0);
    }

    #[test]
    fn mode_key_toggles_without_touching_report() {
        let mut encoder = KeypadEncoder::new();
        let mut report = BootKeyboardReport::default();
        assert!(!encoder.special_mode());
        encoder.encode(Mode, &mut report).unwrap();
        assert!(encoder.special_mode());
        assert_eq!(report, BootKeyboardReport::RELEASED);
        encoder.encode(Mode, &mut report).unwrap();
        assert!(!encoder.special_mode());
        for _ in 0..3 {
            encoder.encode(Mode, &mut report).unwrap();
        }
        assert!(encoder.special_mode());
    }

    #[test]
    fn mode_persists_across_reports() {
        let mut encoder = KeypadEncoder::new();
        encoder.chord([Mode]);
        assert_eq!(encoder.chord([Math]).keys[0], Keyboard::F1 as u8);
        assert_eq!(encoder.chord([Power]).keys[0], Keyboard::F8 as u8);
        encoder.chord([Mode]);
        assert_eq!(encoder.chord([Math]).keys[0], Keyboard::A as u8);
    }

    #[test]
    fn chord_drops_keys_past_rollover() {
        let mut encoder = KeypadEncoder::new();
        let report = encoder.chord([Math, Apps, Prgm, Recip, Sin, Cos, Tan, Second]);
        assert_eq!(report.key_count(), 6);
        assert!(!report.keys.contains(&(Keyboard::G as u8)));
        assert!(report.modifiers().left_shift());
    }

    #[test]
    fn keystroke_report() {
        let report = BootKeyboardReport::keystroke(Modifiers::SHIFT, Keyboard::Keyboard1);
        assert_eq!(report.to_bytes(), [0b10, 0, Keyboard::Keyboard1 as u8, 0, 0, 0, 0, 0]);
    }
}
