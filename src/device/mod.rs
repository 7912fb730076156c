//!Implemented HID devices
pub mod keyboard;
