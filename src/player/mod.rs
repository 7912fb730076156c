//! Timed playback of compiled frames
//!
//! [`Scheduler`] advances one frame per tick. [`Player`] is the control loop around it:
//! every iteration lets the transport process bus events (which drives the handshake),
//! polls the local keypad and runs one scheduler tick. Ticks are paced with fixed delays,
//! submitted transfers are never awaited.

use delegate::delegate;
use embedded_hal::delay::DelayNs;
use heapless::Vec;
use log::{debug, info, trace, warn};

use crate::device::keyboard::BootKeyboardReport;
use crate::hid_class::{HandshakeHandler, HandshakeState};
use crate::keypad::{EdgeDetector, Keypad};
use crate::script::{CompiledFrame, FrameKind};
use crate::transport::Transport;

pub mod config;

pub use config::{PlaybackConfig, PlaybackConfigBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Waiting for the start key
    Idle,
    Playing,
    /// Counting down a hold frame
    Holding,
    /// Every frame was played
    Done,
    /// Stopped by the cancel key
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Cancelled,
}

/// Inputs sampled once per control loop iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    /// Start key went down since the previous iteration
    pub start: bool,
    /// Cancel key is held
    pub cancel: bool,
    /// Host handshake has completed
    pub ready: bool,
}

/// Walks a compiled frame sequence, one frame per tick
pub struct Scheduler<const N: usize> {
    frames: Vec<CompiledFrame, N>,
    config: PlaybackConfig,
    index: Option<usize>,
    repeat: Option<u16>,
    state: PlaybackState,
}

impl<const N: usize> Scheduler<N> {
    pub fn new(frames: Vec<CompiledFrame, N>, config: PlaybackConfig) -> Self {
        Self {
            frames,
            config,
            index: None,
            repeat: None,
            state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the next frame to play, `None` before the start key was seen
    pub fn position(&self) -> Option<usize> {
        self.index
    }

    /// Ticks left on the current hold
    pub fn remaining_hold(&self) -> Option<u16> {
        self.repeat
    }

    pub fn frames(&self) -> &[CompiledFrame] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, PlaybackState::Done | PlaybackState::Cancelled)
    }

    /// Runs one tick.
    ///
    /// Cancellation is honoured before anything else. No report is submitted while
    /// `signals.ready` is false.
    pub fn tick<T: Transport, D: DelayNs>(
        &mut self,
        signals: Signals,
        transport: &mut T,
        delay: &mut D,
    ) -> PlaybackState {
        if self.is_finished() {
            return self.state;
        }

        if signals.cancel {
            info!("playback cancelled at frame {:?}", self.index);
            self.repeat = None;
            self.set_state(PlaybackState::Cancelled);
            return self.state;
        }

        let index = match self.index {
            Some(index) => index,
            None if signals.start => {
                info!("playback started, {} frames", self.frames.len());
                self.set_state(PlaybackState::Playing);
                self.index = Some(0);
                if self.frames.is_empty() {
                    self.set_state(PlaybackState::Done);
                    return self.state;
                }
                0
            }
            None => return self.state,
        };

        if !signals.ready {
            return self.state;
        }

        let frame = self.frames[index];
        match frame.kind {
            FrameKind::Hold { iterations } => {
                let remaining = self.repeat.unwrap_or(iterations).saturating_sub(1);
                if remaining == 0 {
                    self.repeat = None;
                    self.advance(index);
                } else {
                    self.repeat = Some(remaining);
                    self.set_state(PlaybackState::Holding);
                }
                delay.delay_ms(self.config.hold_tick_ms);
            }
            kind => {
                trace!("frame {}: {:?}", index, frame.report.to_bytes());
                submit(transport, &frame.report, index);
                delay.delay_ms(self.config.press_gap_ms);
                submit(transport, &BootKeyboardReport::RELEASED, index);
                self.advance(index);
                delay.delay_ms(match kind {
                    FrameKind::Enter => self.config.enter_gap_ms,
                    _ => self.config.tick_gap_ms,
                });
            }
        }
        self.state
    }

    fn advance(&mut self, index: usize) {
        let next = index + 1;
        self.index = Some(next);
        if next >= self.frames.len() {
            info!("playback complete");
            self.set_state(PlaybackState::Done);
        } else {
            self.set_state(PlaybackState::Playing);
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            debug!("playback {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }
}

/// Transfer failures are not retried, the next scheduled report supersedes them
fn submit<T: Transport>(transport: &mut T, report: &BootKeyboardReport, index: usize) {
    if let Err(e) = transport.submit_interrupt_transfer(report) {
        warn!("frame {}: report not sent: {:?}", index, e);
    }
}

/// Control loop driving the handshake and the scheduler
pub struct Player<T, K, D, const N: usize> {
    transport: T,
    keypad: K,
    delay: D,
    handshake: HandshakeHandler,
    scheduler: Scheduler<N>,
    start: EdgeDetector,
}

impl<T, K, D, const N: usize> Player<T, K, D, N>
where
    T: Transport,
    K: Keypad,
    D: DelayNs,
{
    pub fn new(transport: T, keypad: K, delay: D, scheduler: Scheduler<N>) -> Self {
        Self {
            transport,
            keypad,
            delay,
            handshake: HandshakeHandler::new(),
            scheduler,
            start: EdgeDetector::new(),
        }
    }

    delegate! {
        to self.scheduler {
            pub fn state(&self) -> PlaybackState;
            pub fn position(&self) -> Option<usize>;
            pub fn is_finished(&self) -> bool;
        }
    }

    pub fn handshake_state(&self) -> HandshakeState {
        self.handshake.state()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One control loop iteration
    pub fn step(&mut self) -> PlaybackState {
        self.transport.poll_events(&mut self.handshake);

        let signals = Signals {
            cancel: self.keypad.cancel_pressed(),
            start: self.start.rising(self.keypad.start_pressed()),
            ready: self.handshake.is_ready(),
        };
        self.scheduler
            .tick(signals, &mut self.transport, &mut self.delay)
    }

    /// Loops until every frame was played or the cancel key was pressed
    pub fn run(&mut self) -> PlaybackOutcome {
        loop {
            match self.step() {
                PlaybackState::Done => return PlaybackOutcome::Completed,
                PlaybackState::Cancelled => return PlaybackOutcome::Cancelled,
                _ => {}
            }
        }
    }

    pub fn into_parts(self) -> (T, K, D) {
        (self.transport, self.keypad, self.delay)
    }
}
