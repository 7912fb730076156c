//! Prelude for scripted keyboard playback
//!
//! The purpose of this module is to alleviate imports of structs and enums
//! required to compile a script and play it back to a host.
//!
//! ```
//! # #![allow(unused_imports)]
//! use usbd_keystroke_player::prelude::*;
//! ```

pub use crate::device::keyboard::{BootKeyboardReport, KeypadEncoder, Modifiers, RolloverError};
pub use crate::hid_class::{HandshakeHandler, HandshakeState};
pub use crate::keypad::{lookup, KeyMode, Keypad, LogicalKey};
pub use crate::page::Keyboard;
pub use crate::player::{
    PlaybackConfig, PlaybackConfigBuilder, PlaybackOutcome, PlaybackState, Player, Scheduler,
};
pub use crate::script::{compile, CompiledFrame, FrameKind, DEFAULT_HOLD_ITERATIONS};
pub use crate::transport::{DeviceIdentity, Transport, UsbTransport};
pub use crate::{BuilderError, BuilderResult};
