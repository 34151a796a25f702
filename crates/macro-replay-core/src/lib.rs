//! Macro Replay Core Library
//!
//! Records global mouse and keyboard input into timestamped macros and replays
//! them with faithful timing, optional speed scaling, repetition, looping and
//! hotkey cancellation. Capture goes through `rdev`, injection through `enigo`.
//!
//! # Example
//!
//! ```no_run
//! use macro_replay_core::{EngineConfig, EngineResult, MacroEngine, MacroStore, PlaybackOptions};
//!
//! use std::{thread::sleep, time::Duration};
//!
//! fn main() -> EngineResult<()> {
//!     let store = MacroStore::new("macros")?;
//!     let engine = MacroEngine::with_system_backends(store, None, EngineConfig::default());
//!
//!     engine.start_recording()?;
//!     sleep(Duration::from_secs(5));
//!     let stopped = engine.stop_recording()?;
//!     println!("Recorded {}", stopped.recorded.summary());
//!
//!     let outcome = engine.play_current(&PlaybackOptions::repeated(2.0, 3))?;
//!     println!("Passes completed: {}", outcome.passes_completed);
//!     Ok(())
//! }
//! ```

mod capture;
mod clock;
mod engine;
mod error;
mod hotkey;
mod inject;
mod model;
mod player;
mod recorder;
mod session;
mod store;
mod throttle;

pub use {
    capture::{CaptureSource, Captured, RawInput, RdevCapture, key_name},
    clock::{Clock, ManualClock, SystemClock},
    engine::{EngineConfig, EngineParts, MacroEngine, StoppedRecording},
    error::{EngineError, Result as EngineResult},
    hotkey::{HotkeyMonitor, MonitorGuard, StopHotkeys},
    inject::{EnigoInjector, InjectionError, InjectorFactory, InputInjector, enigo_key},
    model::{Event, Macro, MacroStats, MouseButton},
    player::{
        CancelFlag, DEFAULT_POLL_INTERVAL, MAX_LOOP_DELAY_SECS, MAX_REPEAT, MAX_SPEED, MIN_REPEAT,
        MIN_SPEED, PlaybackEnd, PlaybackMode, PlaybackOptions, PlaybackOutcome, Player, PlayerConfig,
    },
    recorder::{DEFAULT_CHANNEL_CAPACITY, Recorder, RecorderConfig},
    session::{Activity, SessionSnapshot, SessionState},
    store::{MacroStore, MacroSummary},
    throttle::{DEFAULT_MIN_MOVE_INTERVAL, ThrottlePolicy},
};

use std::sync::{Mutex, MutexGuard};

use tracing::error;

/// Lock `mutex`, recovering the data if a previous holder panicked.
///
/// Guarded values are plain flags and slots that stay consistent across a
/// panic.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        error!("Recovered from poisoned lock");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests;
