//! OS input capture.
//!
//! A [`CaptureSource`] turns OS hook callbacks into [`Captured`] values pushed
//! into a bounded channel. The recorder drains that channel on its own thread,
//! so hook latency never depends on accumulation work.

mod rdev_source;

pub use rdev_source::{RdevCapture, key_name};

#[cfg(test)]
pub(crate) use rdev_source::classify;

use crate::{EngineResult, model::Event, model::MouseButton};

use std::time::Duration;

use crossbeam_channel::Sender;

/// A classified OS input notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// Pointer moved.
    MouseMove {
        /// Horizontal screen position.
        x: i32,
        /// Vertical screen position.
        y: i32,
    },
    /// Button pressed or released at the current pointer position.
    MouseButton {
        /// Horizontal screen position.
        x: i32,
        /// Vertical screen position.
        y: i32,
        /// Button that changed.
        button: MouseButton,
        /// `true` for press.
        pressed: bool,
    },
    /// Wheel turned at the current pointer position.
    MouseWheel {
        /// Horizontal screen position.
        x: i32,
        /// Vertical screen position.
        y: i32,
        /// Horizontal notches, positive to the right.
        dx: i32,
        /// Vertical notches, positive upwards.
        dy: i32,
    },
    /// Key pressed or released.
    Key {
        /// Platform-neutral key identifier.
        key: String,
        /// `true` for press.
        pressed: bool,
    },
}

impl RawInput {
    /// True for pointer moves, the only throttled kind.
    pub fn is_mouse_move(&self) -> bool {
        matches!(self, RawInput::MouseMove { .. })
    }

    /// Convert into an [`Event`] stamped `t` seconds into the recording.
    pub fn into_event(self, t: f64) -> Event {
        match self {
            RawInput::MouseMove { x, y } => Event::MouseMove { t, x, y },
            RawInput::MouseButton {
                x,
                y,
                button,
                pressed,
            } => Event::MouseClick {
                t,
                x,
                y,
                button,
                pressed,
            },
            RawInput::MouseWheel { x, y, dx, dy } => Event::MouseScroll { t, x, y, dx, dy },
            RawInput::Key { key, pressed: true } => Event::KeyPress { t, key },
            RawInput::Key { key, pressed: false } => Event::KeyRelease { t, key },
        }
    }
}

/// An input stamped with the capture clock at the moment the hook fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    /// Capture clock reading.
    pub at: Duration,
    /// The classified input.
    pub input: RawInput,
}

/// A subscribable stream of OS input.
pub trait CaptureSource: Send + Sync {
    /// Start delivering input into `sink`.
    ///
    /// Fails with `CaptureUnavailable` when the OS refuses the hook.
    fn subscribe(&self, sink: Sender<Captured>) -> EngineResult<()>;

    /// Stop delivering input and drop the sink.
    ///
    /// The recorder relies on the sink being dropped: its accumulation loop
    /// ends once every sender is gone.
    fn unsubscribe(&self);
}
