use std::time::Instant;

use uuid::Uuid;

/// What the application is doing, with a session ID for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Nothing running.
    Idle,
    /// Capturing input.
    Recording {
        /// When recording started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
    /// Replaying the current macro on a blocking task.
    Playing {
        /// When playback started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
        /// Whether the playback loops until stopped.
        looping: bool,
    },
}

impl AppState {
    /// Session ID of the running activity.
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            AppState::Idle => None,
            AppState::Recording { session_id, .. } | AppState::Playing { session_id, .. } => {
                Some(*session_id)
            }
        }
    }
}
