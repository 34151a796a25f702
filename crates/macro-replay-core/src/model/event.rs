use serde::{Deserialize, Serialize};

/// Mouse button of a click event.
///
/// Always written as `"left"`, `"right"` or `"middle"`. Files produced by
/// older recorders spell buttons as `"Button.left"`; those are accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    /// Primary button.
    #[serde(alias = "Button.left")]
    Left,
    /// Secondary button.
    #[serde(alias = "Button.right")]
    Right,
    /// Wheel button.
    #[serde(alias = "Button.middle")]
    Middle,
}

/// A single captured input action.
///
/// `t` is the number of seconds since the first event of the recording and is
/// stored under the `timestamp` key. Key identifiers are platform-neutral
/// strings: the character itself for printable keys, `Key.<name>` for named
/// keys (`Key.enter`, `Key.ctrl_l`, ...) and `<code>` for raw key codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Pointer moved to an absolute position.
    MouseMove {
        /// Seconds since the first event.
        #[serde(rename = "timestamp")]
        t: f64,
        /// Horizontal screen position.
        x: i32,
        /// Vertical screen position.
        y: i32,
    },
    /// Mouse button changed state at a position.
    MouseClick {
        /// Seconds since the first event.
        #[serde(rename = "timestamp")]
        t: f64,
        /// Horizontal screen position.
        x: i32,
        /// Vertical screen position.
        y: i32,
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Scroll wheel moved at a position.
    MouseScroll {
        /// Seconds since the first event.
        #[serde(rename = "timestamp")]
        t: f64,
        /// Horizontal screen position.
        x: i32,
        /// Vertical screen position.
        y: i32,
        /// Horizontal notches, positive to the right.
        dx: i32,
        /// Vertical notches, positive upwards.
        dy: i32,
    },
    /// Key went down.
    KeyPress {
        /// Seconds since the first event.
        #[serde(rename = "timestamp")]
        t: f64,
        /// Platform-neutral key identifier.
        key: String,
    },
    /// Key went up.
    KeyRelease {
        /// Seconds since the first event.
        #[serde(rename = "timestamp")]
        t: f64,
        /// Platform-neutral key identifier.
        key: String,
    },
}

impl Event {
    /// Seconds since the first event of the recording.
    pub fn t(&self) -> f64 {
        match self {
            Event::MouseMove { t, .. }
            | Event::MouseClick { t, .. }
            | Event::MouseScroll { t, .. }
            | Event::KeyPress { t, .. }
            | Event::KeyRelease { t, .. } => *t,
        }
    }

    /// Name used for the `type` field of the file schema.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::MouseMove { .. } => "mouse_move",
            Event::MouseClick { .. } => "mouse_click",
            Event::MouseScroll { .. } => "mouse_scroll",
            Event::KeyPress { .. } => "key_press",
            Event::KeyRelease { .. } => "key_release",
        }
    }

    /// True for a button press (not a release).
    pub fn is_click_press(&self) -> bool {
        matches!(self, Event::MouseClick { pressed: true, .. })
    }
}
