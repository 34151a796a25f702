use crate::config::{
    default_loop_delay_secs, default_poll_interval_ms, default_repeat_count, default_speed,
};

use std::time::Duration;

use macro_replay_core::{PlaybackOptions, PlayerConfig};
use serde::{Deserialize, Serialize};

/// Defaults applied to playbacks started from the tray.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Speed multiplier (0.5 to 2.0).
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Passes for "Play Last" (1 to 100).
    #[serde(default = "default_repeat_count")]
    pub repeat_count: u32,
    /// Pause between passes for "Loop Last", in seconds (0 to 10).
    #[serde(default = "default_loop_delay_secs")]
    pub loop_delay_secs: f64,
    /// Longest uninterrupted sleep while replaying, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl PlaybackConfig {
    /// Options for a bounded or looping playback.
    pub fn options(&self, looping: bool) -> PlaybackOptions {
        if looping {
            PlaybackOptions::looped(self.speed, self.loop_delay_secs)
        } else {
            PlaybackOptions::repeated(self.speed, self.repeat_count)
        }
    }

    /// Engine-side player settings.
    pub fn player(&self) -> PlayerConfig {
        PlayerConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            repeat_count: default_repeat_count(),
            loop_delay_secs: default_loop_delay_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
