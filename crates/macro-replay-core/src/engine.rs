//! One object owning a whole record/replay session.

use crate::{
    Clock, EngineError, EngineResult, SessionSnapshot, SessionState, SystemClock,
    capture::{CaptureSource, RdevCapture},
    hotkey::HotkeyMonitor,
    inject::{EnigoInjector, InjectorFactory, InputInjector},
    lock_or_recover,
    model::Macro,
    player::{PlaybackOptions, PlaybackOutcome, Player, PlayerConfig},
    recorder::{Recorder, RecorderConfig},
    store::{MacroStore, MacroSummary},
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use error_location::ErrorLocation;
use tracing::{info, instrument, warn};

/// Tuning for the recorder and player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Capture settings.
    pub recorder: RecorderConfig,
    /// Playback settings.
    pub player: PlayerConfig,
}

/// Everything an engine is built from. Tests swap in fakes here.
pub struct EngineParts {
    /// OS input stream.
    pub source: Arc<dyn CaptureSource>,
    /// OS input synthesis.
    pub injectors: Arc<dyn InjectorFactory>,
    /// Time source for playback.
    pub clock: Arc<dyn Clock>,
    /// Stop-hotkey presses, if the host forwards them.
    pub monitor: Option<HotkeyMonitor>,
    /// Where macros are saved.
    pub store: MacroStore,
    /// Tuning.
    pub config: EngineConfig,
}

/// Result of [`MacroEngine::stop_recording`].
#[derive(Debug, Clone)]
pub struct StoppedRecording {
    /// The sealed macro, now current.
    pub recorded: Arc<Macro>,
    /// Where it was auto-saved. `None` for empty recordings or when the save
    /// failed.
    pub saved_to: Option<PathBuf>,
}

/// Recorder, player and store sharing one session and one current macro.
pub struct MacroEngine {
    session: Arc<SessionState>,
    recorder: Recorder,
    player: Player,
    store: MacroStore,
    current: Mutex<Option<Arc<Macro>>>,
}

impl MacroEngine {
    /// Assemble an engine from parts.
    pub fn new(parts: EngineParts) -> Self {
        let session = Arc::new(SessionState::new());
        let recorder = Recorder::new(Arc::clone(&session), parts.source, parts.config.recorder);
        let player = Player::new(
            Arc::clone(&session),
            parts.clock,
            parts.injectors,
            parts.monitor,
            parts.config.player,
        );

        Self {
            session,
            recorder,
            player,
            store: parts.store,
            current: Mutex::new(None),
        }
    }

    /// Engine backed by the real OS: `rdev` capture, `enigo` injection and the
    /// system clock.
    pub fn with_system_backends(
        store: MacroStore,
        monitor: Option<HotkeyMonitor>,
        config: EngineConfig,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let source: Arc<dyn CaptureSource> = Arc::new(RdevCapture::new(Arc::clone(&clock)));
        let injectors: Arc<dyn InjectorFactory> =
            Arc::new(|| -> EngineResult<Box<dyn InputInjector>> {
                Ok(Box::new(EnigoInjector::new()?))
            });

        Self::new(EngineParts {
            source,
            injectors,
            clock,
            monitor,
            store,
            config,
        })
    }

    /// Shared session state.
    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Recording and playback flags plus the live event count.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Macro storage.
    pub fn store(&self) -> &MacroStore {
        &self.store
    }

    /// Begin recording.
    #[track_caller]
    pub fn start_recording(&self) -> EngineResult<()> {
        self.recorder.start()
    }

    /// Stop recording, make the result current and auto-save it if non-empty.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop_recording(&self) -> EngineResult<StoppedRecording> {
        let recorded = Arc::new(self.recorder.stop()?);
        self.set_current(Arc::clone(&recorded));

        let saved_to = if recorded.is_empty() {
            info!("Empty recording, not auto-saved");
            None
        } else {
            match self.store.save(&recorded) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(error = %e, name = recorded.name(), "Auto-save failed, macro kept in memory");
                    None
                }
            }
        };

        Ok(StoppedRecording { recorded, saved_to })
    }

    /// Live length of the recording in progress.
    pub fn event_count(&self) -> usize {
        self.recorder.event_count()
    }

    /// The current macro, if any.
    pub fn current(&self) -> Option<Arc<Macro>> {
        lock_or_recover(&self.current).clone()
    }

    /// Load a saved macro and make it current. The file is not modified.
    #[track_caller]
    pub fn load(&self, name: &str) -> EngineResult<Arc<Macro>> {
        let loaded = Arc::new(self.store.load(name)?);
        self.set_current(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Save the current macro under its own name.
    #[track_caller]
    pub fn save_current(&self) -> EngineResult<PathBuf> {
        let current = self.require_current()?;
        self.store.save(&current)
    }

    /// Save a renamed copy of the current macro and make the copy current.
    #[track_caller]
    #[instrument(skip(self, description))]
    pub fn save_current_as(&self, name: &str, description: &str) -> EngineResult<PathBuf> {
        let current = self.require_current()?;
        let copy = Arc::new(current.renamed(name, description));
        let path = self.store.save(&copy)?;
        self.set_current(copy);
        Ok(path)
    }

    /// Replay the current macro. Blocks until playback ends.
    ///
    /// Fails with `EmptyMacro` when there is no current macro.
    #[track_caller]
    pub fn play_current(&self, options: &PlaybackOptions) -> EngineResult<PlaybackOutcome> {
        let current = self.require_current()?;
        self.player.play(&current, options)
    }

    /// Load `name`, make it current and replay it.
    #[track_caller]
    pub fn play_saved(&self, name: &str, options: &PlaybackOptions) -> EngineResult<PlaybackOutcome> {
        let loaded = self.load(name)?;
        self.player.play(&loaded, options)
    }

    /// Cancel the running playback.
    #[track_caller]
    pub fn stop_playback(&self) -> EngineResult<()> {
        self.player.stop()
    }

    /// Summaries of every saved macro.
    #[track_caller]
    pub fn list(&self) -> EngineResult<Vec<MacroSummary>> {
        self.store.list()
    }

    /// Delete a saved macro. The current macro is unaffected.
    #[track_caller]
    pub fn delete(&self, name: &str) -> EngineResult<()> {
        self.store.delete(name)
    }

    fn set_current(&self, recorded: Arc<Macro>) {
        *lock_or_recover(&self.current) = Some(recorded);
    }

    #[track_caller]
    fn require_current(&self) -> EngineResult<Arc<Macro>> {
        self.current().ok_or_else(|| EngineError::EmptyMacro {
            name: String::from("<none>"),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
