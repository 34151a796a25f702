mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod playback_config;
mod recorder_config;
mod storage_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, config::Config, playback_config::PlaybackConfig,
    recorder_config::RecorderConfig, storage_config::StorageConfig,
};

pub(crate) const DEFAULT_NOTIFICATIONS: bool = true;
pub(crate) const DEFAULT_MIN_MOVE_INTERVAL_MS: u64 = 50;
pub(crate) const DEFAULT_CHANNEL_CAPACITY: usize = 4096;
pub(crate) const DEFAULT_SPEED: f64 = 1.0;
pub(crate) const DEFAULT_REPEAT_COUNT: u32 = 1;
pub(crate) const DEFAULT_LOOP_DELAY_SECS: f64 = 1.0;
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 20;
pub(crate) const MAX_POLL_INTERVAL_MS: u64 = 100;

pub(crate) fn default_notifications() -> bool {
    DEFAULT_NOTIFICATIONS
}

pub(crate) fn default_min_move_interval_ms() -> u64 {
    DEFAULT_MIN_MOVE_INTERVAL_MS
}

pub(crate) fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

pub(crate) fn default_speed() -> f64 {
    DEFAULT_SPEED
}

pub(crate) fn default_repeat_count() -> u32 {
    DEFAULT_REPEAT_COUNT
}

pub(crate) fn default_loop_delay_secs() -> f64 {
    DEFAULT_LOOP_DELAY_SECS
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
