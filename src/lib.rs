//! Scripted USB HID boot keyboard
//!
//! Compiles a character script into boot keyboard reports and plays them back to the
//! host once the HID enumeration handshake has completed.
//!
//! Based on [`usb-device`](<https://crates.io/crates/usb-device>)
#![no_std]

//Allow the use of std in tests
#[cfg(test)]
#[macro_use]
extern crate std;

pub mod device;
pub mod hid_class;
pub mod keypad;
pub mod page;
pub mod player;
pub mod prelude;
pub mod script;
pub mod transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderError {
    ValueOverflow,
}

pub type BuilderResult<B> = core::result::Result<B, BuilderError>;
