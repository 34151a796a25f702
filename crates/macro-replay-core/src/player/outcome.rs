use crate::player::PlaybackMode;

/// Why a playback stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// Every requested pass ran to the end.
    Completed,
    /// Stopped by the hotkey monitor or an explicit stop.
    Cancelled,
}

/// Summary of a finished playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackOutcome {
    /// Bounded or looping.
    pub mode: PlaybackMode,
    /// Passes that ran to their last event.
    pub passes_completed: u32,
    /// Events injected across all passes, including a partial last pass.
    pub events_injected: u64,
    /// How the playback ended.
    pub end: PlaybackEnd,
}

impl PlaybackOutcome {
    pub(crate) fn new(mode: PlaybackMode) -> Self {
        Self {
            mode,
            passes_completed: 0,
            events_injected: 0,
            end: PlaybackEnd::Completed,
        }
    }

    pub(crate) fn finish(mut self, end: PlaybackEnd) -> Self {
        self.end = end;
        self
    }

    /// Ended by cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.end == PlaybackEnd::Cancelled
    }
}
