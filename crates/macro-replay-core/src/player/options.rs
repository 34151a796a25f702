use crate::{EngineError, EngineResult};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;

/// Slowest accepted speed multiplier.
pub const MIN_SPEED: f64 = 0.5;
/// Fastest accepted speed multiplier.
pub const MAX_SPEED: f64 = 2.0;
/// Fewest passes in bounded mode.
pub const MIN_REPEAT: u32 = 1;
/// Most passes in bounded mode.
pub const MAX_REPEAT: u32 = 100;
/// Longest pause between loop passes, in seconds.
pub const MAX_LOOP_DELAY_SECS: f64 = 10.0;

/// Whether a playback has a fixed number of passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Run exactly `repeat_count` passes.
    Bounded {
        /// Number of passes.
        repeat_count: u32,
    },
    /// Run passes until cancelled.
    Looping,
}

/// Parameters of one play invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    /// Speed multiplier; event `t` is divided by it.
    pub speed: f64,
    /// Passes in bounded mode. Ignored when `looping`.
    pub repeat_count: u32,
    /// Repeat until cancelled.
    pub looping: bool,
    /// Pause after each loop pass, in seconds. Ignored unless `looping`.
    pub loop_delay_secs: f64,
}

impl PlaybackOptions {
    /// A single pass at `speed`.
    pub fn once(speed: f64) -> Self {
        Self::repeated(speed, 1)
    }

    /// `repeat_count` back-to-back passes at `speed`.
    pub fn repeated(speed: f64, repeat_count: u32) -> Self {
        Self {
            speed,
            repeat_count,
            looping: false,
            loop_delay_secs: 0.0,
        }
    }

    /// Passes at `speed` until cancelled, pausing `loop_delay_secs` between them.
    pub fn looped(speed: f64, loop_delay_secs: f64) -> Self {
        Self {
            speed,
            repeat_count: MIN_REPEAT,
            looping: true,
            loop_delay_secs,
        }
    }

    /// Bounded or looping.
    pub fn mode(&self) -> PlaybackMode {
        if self.looping {
            PlaybackMode::Looping
        } else {
            PlaybackMode::Bounded {
                repeat_count: self.repeat_count,
            }
        }
    }

    /// Pause between loop passes.
    pub fn loop_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.loop_delay_secs).unwrap_or_default()
    }

    /// Check every parameter against its accepted range.
    #[track_caller]
    pub fn validate(&self) -> EngineResult<()> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(EngineError::InvalidSpeed {
                speed: self.speed,
                min: MIN_SPEED,
                max: MAX_SPEED,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !self.looping && !(MIN_REPEAT..=MAX_REPEAT).contains(&self.repeat_count) {
            return Err(EngineError::InvalidRepeat {
                repeat: self.repeat_count,
                min: MIN_REPEAT,
                max: MAX_REPEAT,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.looping && !(0.0..=MAX_LOOP_DELAY_SECS).contains(&self.loop_delay_secs) {
            return Err(EngineError::InvalidLoopDelay {
                seconds: self.loop_delay_secs,
                max: MAX_LOOP_DELAY_SECS,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self::once(1.0)
    }
}
