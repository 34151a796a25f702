use crate::{
    Clock, EngineError, EngineResult, SessionState,
    hotkey::HotkeyMonitor,
    inject::{InjectorFactory, InputInjector},
    lock_or_recover,
    model::Macro,
    player::{CancelFlag, PlaybackEnd, PlaybackMode, PlaybackOptions, PlaybackOutcome},
};

use std::{
    panic::Location,
    sync::{Arc, Mutex},
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Default length of one interruptible sleep slice.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Player tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Longest uninterrupted sleep; bounds cancellation latency.
    pub poll_interval: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Replays macros with their recorded timing.
///
/// `play` blocks the calling thread until the playback ends; `stop` may be
/// called from any other thread.
pub struct Player {
    session: Arc<SessionState>,
    clock: Arc<dyn Clock>,
    injectors: Arc<dyn InjectorFactory>,
    monitor: Option<HotkeyMonitor>,
    config: PlayerConfig,
    active: Mutex<Option<CancelFlag>>,
}

/// Whether a wait reached its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wait {
    Reached,
    Cancelled,
}

impl Player {
    /// Create a player.
    ///
    /// With a `monitor`, stop hotkeys are watched for the duration of every
    /// playback.
    pub fn new(
        session: Arc<SessionState>,
        clock: Arc<dyn Clock>,
        injectors: Arc<dyn InjectorFactory>,
        monitor: Option<HotkeyMonitor>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            session,
            clock,
            injectors,
            monitor,
            config,
            active: Mutex::new(None),
        }
    }

    /// Replay `recording` according to `options`.
    ///
    /// # Errors
    ///
    /// `InvalidSpeed`, `InvalidRepeat`, `InvalidLoopDelay` for out-of-range
    /// options; `AlreadyPlaying` or `Busy` when the session is not idle;
    /// `EmptyMacro`; `InjectorUnavailable`; `PlaybackFailed` when the OS refuses
    /// an event. The session is idle again whenever this returns.
    #[track_caller]
    #[instrument(skip(self, recording), fields(name = recording.name(), events = recording.len()))]
    pub fn play(&self, recording: &Macro, options: &PlaybackOptions) -> EngineResult<PlaybackOutcome> {
        options.validate()?;

        let flag = CancelFlag::new();
        let _active = ActivePlayback::begin(self, options.mode(), flag.clone())?;

        if recording.is_empty() {
            return Err(EngineError::EmptyMacro {
                name: recording.name().to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        // Armed before the injector opens: stop presses made while the
        // backend starts up must still cancel.
        let _monitor = self.monitor.as_ref().map(|m| m.arm(flag.clone()));
        let mut injector = self.injectors.create()?;

        info!(speed = options.speed, mode = ?options.mode(), "Playback started");

        let outcome = self.run(recording, options, &flag, injector.as_mut());

        match &outcome {
            Ok(o) => info!(
                passes = o.passes_completed,
                events = o.events_injected,
                end = ?o.end,
                "Playback finished"
            ),
            Err(e) => warn!(error = %e, "Playback aborted"),
        }

        outcome
    }

    /// Request cancellation of the running playback.
    ///
    /// Returns once the request is signalled; the playing thread notices it
    /// within one poll interval.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&self) -> EngineResult<()> {
        let active = lock_or_recover(&self.active);
        self.session.ensure_playing()?;

        if let Some(flag) = active.as_ref() {
            if flag.cancel() {
                info!("Playback stop requested");
            }
        }

        Ok(())
    }

    fn run(
        &self,
        recording: &Macro,
        options: &PlaybackOptions,
        flag: &CancelFlag,
        injector: &mut dyn InputInjector,
    ) -> EngineResult<PlaybackOutcome> {
        let mode = options.mode();
        let mut outcome = PlaybackOutcome::new(mode);

        loop {
            if flag.is_cancelled() {
                return Ok(outcome.finish(PlaybackEnd::Cancelled));
            }

            if let PlaybackMode::Bounded { repeat_count } = mode {
                if outcome.passes_completed >= repeat_count {
                    return Ok(outcome.finish(PlaybackEnd::Completed));
                }
            }

            let pass = outcome.passes_completed + 1;
            debug!(pass, "Pass started");

            if self.run_pass(recording, options.speed, pass, flag, injector, &mut outcome)?
                == Wait::Cancelled
            {
                return Ok(outcome.finish(PlaybackEnd::Cancelled));
            }
            outcome.passes_completed = pass;

            if mode == PlaybackMode::Looping {
                let resume_at = self.clock.now() + options.loop_delay();
                if self.wait_until(resume_at, flag) == Wait::Cancelled {
                    return Ok(outcome.finish(PlaybackEnd::Cancelled));
                }
            }
        }
    }

    /// One pass: each event fires `t / speed` seconds after the pass started.
    #[track_caller]
    fn run_pass(
        &self,
        recording: &Macro,
        speed: f64,
        pass: u32,
        flag: &CancelFlag,
        injector: &mut dyn InputInjector,
        outcome: &mut PlaybackOutcome,
    ) -> EngineResult<Wait> {
        let pass_start = self.clock.now();

        for (event_index, event) in recording.events().iter().enumerate() {
            let offset = Duration::try_from_secs_f64(event.t() / speed).unwrap_or_default();

            if self.wait_until(pass_start + offset, flag) == Wait::Cancelled {
                debug!(pass, event_index, "Pass cancelled");
                return Ok(Wait::Cancelled);
            }

            injector
                .inject(event)
                .map_err(|e| EngineError::PlaybackFailed {
                    pass,
                    event_index,
                    reason: e.reason,
                    location: ErrorLocation::from(Location::caller()),
                })?;
            outcome.events_injected += 1;
        }

        Ok(Wait::Reached)
    }

    /// Sleep in slices of at most `poll_interval` until `deadline`, checking
    /// the flag before every slice.
    fn wait_until(&self, deadline: Duration, flag: &CancelFlag) -> Wait {
        loop {
            if flag.is_cancelled() {
                return Wait::Cancelled;
            }
            let now = self.clock.now();
            if now >= deadline {
                return Wait::Reached;
            }
            self.clock
                .sleep((deadline - now).min(self.config.poll_interval));
        }
    }
}

/// Holds the session in `Playing` and publishes the cancel flag for `stop`.
/// Dropping it returns the session to idle.
struct ActivePlayback<'a> {
    player: &'a Player,
}

impl<'a> ActivePlayback<'a> {
    #[track_caller]
    fn begin(player: &'a Player, mode: PlaybackMode, flag: CancelFlag) -> EngineResult<Self> {
        let mut active = lock_or_recover(&player.active);
        player.session.begin_playback(mode)?;
        *active = Some(flag);
        Ok(Self { player })
    }
}

impl Drop for ActivePlayback<'_> {
    fn drop(&mut self) {
        let mut active = lock_or_recover(&self.player.active);
        active.take();
        self.player.session.end_playback();
    }
}
