use macro_replay_core::PlaybackOutcome;

use uuid::Uuid;

/// Commands sent from the hotkey handler and background tasks to the main
/// application.
#[derive(Debug)]
pub enum AppCommand {
    /// Start recording when idle, stop when recording.
    ToggleRecording,
    /// Replay the current macro.
    Play {
        /// Repeat until stopped instead of the configured repeat count.
        looping: bool,
    },
    /// Cancel the running playback.
    StopPlayback,
    /// A background playback returned.
    PlaybackFinished {
        /// Session ID of the playback.
        session_id: Uuid,
        /// Outcome, or the rendered error.
        result: Result<PlaybackOutcome, String>,
    },
    /// Request application shutdown.
    Shutdown,
}
