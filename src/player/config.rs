//! Playback timing

use embedded_time::duration::Milliseconds;

use crate::{BuilderError, BuilderResult};

/// Longest accepted delay in milliseconds
pub const MAX_DELAY_MS: u32 = 10_000;

/// Delays applied by the scheduler, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Between a report and its release report
    pub press_gap_ms: u32,
    /// After every tick that sent a keystroke
    pub tick_gap_ms: u32,
    /// After every tick that sent an Enter keystroke
    pub enter_gap_ms: u32,
    /// Per countdown tick of a hold
    pub hold_tick_ms: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            press_gap_ms: 10,
            tick_gap_ms: 20,
            enter_gap_ms: 20,
            hold_tick_ms: 10,
        }
    }
}

#[must_use = "this `PlaybackConfigBuilder` must be assigned or consumed by `::build()`"]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackConfigBuilder {
    config: PlaybackConfig,
}

fn checked(delay: Milliseconds) -> BuilderResult<u32> {
    if delay.0 > MAX_DELAY_MS {
        Err(BuilderError::ValueOverflow)
    } else {
        Ok(delay.0)
    }
}

impl PlaybackConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press_gap(mut self, delay: Milliseconds) -> BuilderResult<Self> {
        self.config.press_gap_ms = checked(delay)?;
        Ok(self)
    }

    pub fn tick_gap(mut self, delay: Milliseconds) -> BuilderResult<Self> {
        self.config.tick_gap_ms = checked(delay)?;
        Ok(self)
    }

    pub fn enter_gap(mut self, delay: Milliseconds) -> BuilderResult<Self> {
        self.config.enter_gap_ms = checked(delay)?;
        Ok(self)
    }

    pub fn hold_tick(mut self, delay: Milliseconds) -> BuilderResult<Self> {
        self.config.hold_tick_ms = checked(delay)?;
        Ok(self)
    }

    pub fn build(self) -> PlaybackConfig {
        self.config
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_defaults() {
        assert_eq!(PlaybackConfigBuilder::new().build(), PlaybackConfig::default());
    }

    #[test]
    fn builder_sets_delays() {
        let config = PlaybackConfigBuilder::new()
            .press_gap(Milliseconds(5))
            .unwrap()
            .tick_gap(Milliseconds(15))
            .unwrap()
            .enter_gap(Milliseconds(250))
            .unwrap()
            .hold_tick(Milliseconds(0))
            .unwrap()
            .build();
        assert_eq!(
            config,
            PlaybackConfig {
                press_gap_ms: 5,
                tick_gap_ms: 15,
                enter_gap_ms: 250,
                hold_tick_ms: 0,
            }
        );
    }

    #[test]
    fn builder_rejects_long_delays() {
        assert_eq!(
            PlaybackConfigBuilder::new().tick_gap(Milliseconds(MAX_DELAY_MS + 1)),
            Err(BuilderError::ValueOverflow)
        );
        assert!(PlaybackConfigBuilder::new().hold_tick(Milliseconds(MAX_DELAY_MS)).is_ok());
    }
}
