use error_location::ErrorLocation;
use thiserror::Error;

/// Recording and playback engine errors with source location tracking.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A recording is already in progress.
    #[error("Already recording {location}")]
    AlreadyRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Stop was requested but no recording is active.
    #[error("Not recording {location}")]
    NotRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A playback is already in progress.
    #[error("Already playing {location}")]
    AlreadyPlaying {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Stop was requested but no playback is active.
    #[error("Not playing {location}")]
    NotPlaying {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Recording and playback cannot run at the same time.
    #[error("Busy: cannot {requested} while {active} {location}")]
    Busy {
        /// The operation that was refused.
        requested: &'static str,
        /// The mode that is currently active.
        active: &'static str,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Playback speed outside the accepted range.
    #[error("Invalid speed {speed}: must be between {min} and {max} {location}")]
    InvalidSpeed {
        /// Requested speed multiplier.
        speed: f64,
        /// Lowest accepted multiplier.
        min: f64,
        /// Highest accepted multiplier.
        max: f64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Repeat count outside the accepted range.
    #[error("Invalid repeat count {repeat}: must be between {min} and {max} {location}")]
    InvalidRepeat {
        /// Requested number of passes.
        repeat: u32,
        /// Lowest accepted count.
        min: u32,
        /// Highest accepted count.
        max: u32,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Delay between loop passes outside the accepted range.
    #[error("Invalid loop delay {seconds}s: must be between 0 and {max}s {location}")]
    InvalidLoopDelay {
        /// Requested delay in seconds.
        seconds: f64,
        /// Longest accepted delay in seconds.
        max: f64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The macro has no events to replay.
    #[error("Macro '{name}' has no events {location}")]
    EmptyMacro {
        /// Name of the empty macro.
        name: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The OS refused a synthesized input event.
    #[error("Playback failed at event {event_index} of pass {pass}: {reason} {location}")]
    PlaybackFailed {
        /// 1-based pass number that was running.
        pass: u32,
        /// 0-based index of the event that failed.
        event_index: usize,
        /// Description of the injection failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The input injection backend could not be opened.
    #[error("Input injection unavailable: {reason} {location}")]
    InjectorUnavailable {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The OS input stream could not be subscribed to.
    #[error("Input capture unavailable: {reason} {location}")]
    CaptureUnavailable {
        /// Description of the failure (usually a permission denial).
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No saved macro with the given name.
    #[error("Macro not found: {name} {location}")]
    MacroNotFound {
        /// Requested macro name.
        name: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Filesystem error in the macro store.
    #[error("Storage error: {source} {location}")]
    Storage {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A macro file could not be encoded or decoded.
    #[error("Macro serialization error: {source} {location}")]
    Serialization {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for EngineError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        EngineError::Storage {
            source,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        EngineError::Serialization {
            source,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;
