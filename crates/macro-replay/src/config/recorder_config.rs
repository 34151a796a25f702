use crate::config::{default_channel_capacity, default_min_move_interval_ms};

use std::time::Duration;

use macro_replay_core::RecorderConfig as EngineRecorderConfig;
use serde::{Deserialize, Serialize};

/// Input capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Minimum spacing between recorded mouse-move samples, in milliseconds.
    #[serde(default = "default_min_move_interval_ms")]
    pub min_move_interval_ms: u64,
    /// Captured inputs buffered before the recorder drains them.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl RecorderConfig {
    /// Engine-side settings.
    pub fn engine(&self) -> EngineRecorderConfig {
        EngineRecorderConfig {
            min_move_interval: Duration::from_millis(self.min_move_interval_ms),
            channel_capacity: self.channel_capacity,
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            min_move_interval_ms: default_min_move_interval_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}
