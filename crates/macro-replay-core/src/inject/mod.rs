//! Synthetic OS input.

mod enigo_injector;

pub use enigo_injector::{EnigoInjector, enigo_key};

use crate::{EngineResult, model::Event};

use thiserror::Error;

/// The OS refused (or cannot express) a synthesized event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct InjectionError {
    /// Human-readable reason.
    pub reason: String,
}

impl InjectionError {
    /// Build an error from any message.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Replays one [`Event`] as OS input.
pub trait InputInjector {
    /// Synthesize `event`.
    fn inject(&mut self, event: &Event) -> Result<(), InjectionError>;
}

/// Opens an injector on the playback thread.
///
/// Injection backends are typically `!Send`, so the player asks for a fresh
/// one at the start of every playback instead of holding one.
pub trait InjectorFactory: Send + Sync {
    /// Open a new injector.
    fn create(&self) -> EngineResult<Box<dyn InputInjector>>;
}

impl<F> InjectorFactory for F
where
    F: Fn() -> EngineResult<Box<dyn InputInjector>> + Send + Sync,
{
    fn create(&self) -> EngineResult<Box<dyn InputInjector>> {
        self()
    }
}
