//! Process-wide recording/playback state with guarded transitions.
//!
//! Recording and playback are mutually exclusive, so the state is a single
//! enum behind one mutex: every transition is checked and applied under the
//! same lock and no caller can observe a half-applied change.

use crate::{EngineError, EngineResult, lock_or_recover, player::PlaybackMode};

use std::{
    panic::Location,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use error_location::ErrorLocation;
use tracing::debug;

/// What the engine is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    /// Neither recording nor playing.
    #[default]
    Idle,
    /// Capturing input into a new macro.
    Recording,
    /// Replaying a macro.
    Playing(PlaybackMode),
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// A recording is in progress.
    pub recording: bool,
    /// A playback is in progress.
    pub playing: bool,
    /// The playback in progress is an unbounded loop.
    pub looping: bool,
    /// Events captured so far by the current (or last) recording.
    pub event_count: usize,
}

/// Shared session state. Hand it around as `Arc<SessionState>`.
#[derive(Debug, Default)]
pub struct SessionState {
    activity: Mutex<Activity>,
    event_count: AtomicUsize,
}

impl SessionState {
    /// Create an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current activity.
    pub fn activity(&self) -> Activity {
        *lock_or_recover(&self.activity)
    }

    /// Read all flags at once.
    pub fn snapshot(&self) -> SessionSnapshot {
        let activity = self.activity();
        SessionSnapshot {
            recording: activity == Activity::Recording,
            playing: matches!(activity, Activity::Playing(_)),
            looping: activity == Activity::Playing(PlaybackMode::Looping),
            event_count: self.event_count(),
        }
    }

    /// Events captured so far. Never blocks.
    pub fn event_count(&self) -> usize {
        self.event_count.load(Ordering::Acquire)
    }

    pub(crate) fn set_event_count(&self, count: usize) {
        self.event_count.store(count, Ordering::Release);
    }

    /// Idle -> Recording.
    #[track_caller]
    pub fn begin_recording(&self) -> EngineResult<()> {
        let mut activity = lock_or_recover(&self.activity);
        match *activity {
            Activity::Idle => {
                *activity = Activity::Recording;
                self.set_event_count(0);
                debug!("Session: recording");
                Ok(())
            }
            Activity::Recording => Err(EngineError::AlreadyRecording {
                location: ErrorLocation::from(Location::caller()),
            }),
            Activity::Playing(_) => Err(EngineError::Busy {
                requested: "start recording",
                active: "playing",
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Fails with `NotRecording` unless a recording is in progress.
    #[track_caller]
    pub fn ensure_recording(&self) -> EngineResult<()> {
        if self.activity() == Activity::Recording {
            Ok(())
        } else {
            Err(EngineError::NotRecording {
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }

    /// Recording -> Idle.
    #[track_caller]
    pub fn end_recording(&self) -> EngineResult<()> {
        let mut activity = lock_or_recover(&self.activity);
        if *activity != Activity::Recording {
            return Err(EngineError::NotRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        *activity = Activity::Idle;
        debug!("Session: idle");
        Ok(())
    }

    /// Idle -> Playing.
    #[track_caller]
    pub fn begin_playback(&self, mode: PlaybackMode) -> EngineResult<()> {
        let mut activity = lock_or_recover(&self.activity);
        match *activity {
            Activity::Idle => {
                *activity = Activity::Playing(mode);
                debug!(?mode, "Session: playing");
                Ok(())
            }
            Activity::Playing(_) => Err(EngineError::AlreadyPlaying {
                location: ErrorLocation::from(Location::caller()),
            }),
            Activity::Recording => Err(EngineError::Busy {
                requested: "play",
                active: "recording",
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Fails with `NotPlaying` unless a playback is in progress.
    #[track_caller]
    pub fn ensure_playing(&self) -> EngineResult<()> {
        if matches!(self.activity(), Activity::Playing(_)) {
            Ok(())
        } else {
            Err(EngineError::NotPlaying {
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }

    /// Playing -> Idle. No-op in any other state.
    pub(crate) fn end_playback(&self) {
        let mut activity = lock_or_recover(&self.activity);
        if matches!(*activity, Activity::Playing(_)) {
            *activity = Activity::Idle;
            debug!("Session: idle");
        }
    }
}
