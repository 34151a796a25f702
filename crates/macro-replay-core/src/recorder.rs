//! Turns captured OS input into a sealed [`Macro`].

use crate::{
    EngineError, EngineResult, SessionState,
    capture::{CaptureSource, Captured},
    lock_or_recover,
    model::{Event, Macro},
    throttle::{DEFAULT_MIN_MOVE_INTERVAL, ThrottlePolicy},
};

use std::{
    panic::Location,
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
    time::Duration,
};

use chrono::Local;
use crossbeam_channel::{Receiver, bounded};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Default capacity of the capture channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 4096;

/// Recorder tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Minimum spacing between kept mouse-move samples.
    pub min_move_interval: Duration,
    /// Inputs buffered between the OS hook and the accumulation thread.
    pub channel_capacity: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            min_move_interval: DEFAULT_MIN_MOVE_INTERVAL,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Records global mouse and keyboard input.
///
/// Capture callbacks only enqueue; a dedicated thread applies the move
/// throttle, timestamps events relative to the first one and keeps the
/// session's live event count current.
pub struct Recorder {
    session: Arc<SessionState>,
    source: Arc<dyn CaptureSource>,
    config: RecorderConfig,
    active: Mutex<Option<JoinHandle<Vec<Event>>>>,
}

impl Recorder {
    /// Create a recorder reading from `source`.
    pub fn new(
        session: Arc<SessionState>,
        source: Arc<dyn CaptureSource>,
        config: RecorderConfig,
    ) -> Self {
        Self {
            session,
            source,
            config,
            active: Mutex::new(None),
        }
    }

    /// Begin a new recording.
    ///
    /// # Errors
    ///
    /// `AlreadyRecording`, `Busy` while playing, or `CaptureUnavailable` when
    /// the OS refuses the input hook. On error the session is left unchanged.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&self) -> EngineResult<()> {
        let mut active = lock_or_recover(&self.active);
        self.session.begin_recording()?;

        let (tx, rx) = bounded(self.config.channel_capacity.max(1));

        if let Err(e) = self.source.subscribe(tx) {
            self.rollback();
            return Err(e);
        }

        let session = Arc::clone(&self.session);
        let throttle = ThrottlePolicy::new(self.config.min_move_interval);

        let handle = thread::Builder::new()
            .name("macro-recorder".to_string())
            .spawn(move || accumulate(rx, throttle, &session));

        match handle {
            Ok(handle) => {
                *active = Some(handle);
                info!(
                    min_move_interval_ms = self.config.min_move_interval.as_millis() as u64,
                    "Recording started"
                );
                Ok(())
            }
            Err(e) => {
                self.source.unsubscribe();
                self.rollback();
                Err(EngineError::CaptureUnavailable {
                    reason: format!("failed to spawn recorder thread: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Finish the recording and seal it into a macro.
    ///
    /// The macro is named after the current local time and may be empty.
    ///
    /// # Errors
    ///
    /// `NotRecording` when no recording is in progress.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&self) -> EngineResult<Macro> {
        let mut active = lock_or_recover(&self.active);
        self.session.ensure_recording()?;

        self.source.unsubscribe();

        let events = match active.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                error!("Recorder thread panicked, recording discarded");
                Vec::new()
            }),
            None => Vec::new(),
        };

        self.session.end_recording()?;

        let recorded = Macro::seal(events, Local::now().naive_local());
        info!(
            name = recorded.name(),
            events = recorded.len(),
            duration_secs = recorded.duration(),
            "Recording stopped"
        );

        Ok(recorded)
    }

    /// Events captured so far by the current recording. Never blocks.
    pub fn event_count(&self) -> usize {
        self.session.event_count()
    }

    fn rollback(&self) {
        if let Err(e) = self.session.end_recording() {
            warn!(error = %e, "Recording rollback found session already idle");
        }
    }
}

/// Drain `rx` until every sender is dropped.
fn accumulate(rx: Receiver<Captured>, mut throttle: ThrottlePolicy, session: &SessionState) -> Vec<Event> {
    let mut events = Vec::new();
    let mut origin: Option<Duration> = None;
    let mut last_t = 0.0_f64;
    let mut dropped_moves = 0_usize;

    for Captured { at, input } in rx.iter() {
        if !throttle.admit(&input, at) {
            dropped_moves += 1;
            continue;
        }

        let origin = *origin.get_or_insert(at);
        // Hook timestamps can arrive out of order across threads.
        let t = at.saturating_sub(origin).as_secs_f64().max(last_t);
        last_t = t;

        events.push(input.into_event(t));
        session.set_event_count(events.len());
    }

    debug!(kept = events.len(), dropped_moves, "Capture channel closed");
    events
}
