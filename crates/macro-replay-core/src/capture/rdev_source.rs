use crate::{
    Clock, EngineError, EngineResult,
    capture::{CaptureSource, Captured, RawInput},
    lock_or_recover,
    model::MouseButton,
};

use std::{
    panic::Location,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use crossbeam_channel::{RecvTimeoutError, Sender, TrySendError, bounded};
use error_location::ErrorLocation;
use rdev::{Button, EventType, Key};
use tracing::{debug, info, instrument, warn};

/// How long `subscribe` waits for the OS hook to report a startup failure.
///
/// `rdev::listen` blocks for as long as the hook is alive and only returns on
/// error, so silence after this grace period means the hook is running.
const LISTEN_STARTUP_GRACE: Duration = Duration::from_millis(250);

/// Global input capture through `rdev`.
///
/// The OS hook is installed once, on first subscribe, and lives for the rest of
/// the process: `rdev` offers no way to remove it. Unsubscribing detaches the
/// sink so the hook callback becomes a no-op.
pub struct RdevCapture {
    clock: Arc<dyn Clock>,
    sink: Arc<Mutex<Option<Sender<Captured>>>>,
    hook_installed: Mutex<bool>,
}

impl RdevCapture {
    /// Create a capture source stamping input with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            sink: Arc::new(Mutex::new(None)),
            hook_installed: Mutex::new(false),
        }
    }

    #[track_caller]
    fn install_hook(&self) -> EngineResult<()> {
        let (error_tx, error_rx) = bounded::<String>(1);
        let sink = Arc::clone(&self.sink);
        let clock = Arc::clone(&self.clock);

        thread::Builder::new()
            .name("input-capture".to_string())
            .spawn(move || {
                let mut cursor = (0, 0);
                let result = rdev::listen(move |event| {
                    if let Some(input) = classify(event.event_type, &mut cursor) {
                        forward(&sink, clock.as_ref(), input);
                    }
                });
                if let Err(e) = result {
                    let _ = error_tx.send(format!("{:?}", e));
                }
            })
            .map_err(|e| EngineError::CaptureUnavailable {
                reason: format!("Failed to spawn capture thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        match error_rx.recv_timeout(LISTEN_STARTUP_GRACE) {
            Err(RecvTimeoutError::Timeout) => {
                info!("Input hook installed");
                Ok(())
            }
            Ok(reason) => Err(EngineError::CaptureUnavailable {
                reason,
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::CaptureUnavailable {
                reason: "Input hook exited immediately".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

impl CaptureSource for RdevCapture {
    #[instrument(skip(self, sink))]
    fn subscribe(&self, sink: Sender<Captured>) -> EngineResult<()> {
        let mut installed = lock_or_recover(&self.hook_installed);

        *lock_or_recover(&self.sink) = Some(sink);

        if !*installed {
            if let Err(e) = self.install_hook() {
                lock_or_recover(&self.sink).take();
                return Err(e);
            }
            *installed = true;
        }

        debug!("Capture subscribed");
        Ok(())
    }

    fn unsubscribe(&self) {
        lock_or_recover(&self.sink).take();
        debug!("Capture unsubscribed");
    }
}

fn forward(sink: &Mutex<Option<Sender<Captured>>>, clock: &dyn Clock, input: RawInput) {
    let guard = lock_or_recover(sink);
    let Some(sink) = guard.as_ref() else {
        return;
    };

    let captured = Captured {
        at: clock.now(),
        input,
    };

    if let Err(TrySendError::Full(dropped)) = sink.try_send(captured) {
        warn!(input = ?dropped.input, "Capture channel full, dropping input");
    }
}

/// Map an `rdev` event to a [`RawInput`], tracking the pointer position
/// because `rdev` button and wheel events carry none.
pub(crate) fn classify(event: EventType, cursor: &mut (i32, i32)) -> Option<RawInput> {
    let (x, y) = *cursor;
    match event {
        EventType::MouseMove { x, y } => {
            *cursor = (x.round() as i32, y.round() as i32);
            Some(RawInput::MouseMove {
                x: cursor.0,
                y: cursor.1,
            })
        }
        EventType::ButtonPress(button) => Some(RawInput::MouseButton {
            x,
            y,
            button: mouse_button(button)?,
            pressed: true,
        }),
        EventType::ButtonRelease(button) => Some(RawInput::MouseButton {
            x,
            y,
            button: mouse_button(button)?,
            pressed: false,
        }),
        EventType::Wheel { delta_x, delta_y } => Some(RawInput::MouseWheel {
            x,
            y,
            dx: wheel_notches(delta_x),
            dy: wheel_notches(delta_y),
        }),
        EventType::KeyPress(key) => Some(RawInput::Key {
            key: key_name(key),
            pressed: true,
        }),
        EventType::KeyRelease(key) => Some(RawInput::Key {
            key: key_name(key),
            pressed: false,
        }),
    }
}

/// Saturates instead of wrapping on deltas outside `i32`.
fn wheel_notches(delta: i64) -> i32 {
    i32::try_from(delta).unwrap_or(if delta < 0 { i32::MIN } else { i32::MAX })
}

fn mouse_button(button: Button) -> Option<MouseButton> {
    match button {
        Button::Left => Some(MouseButton::Left),
        Button::Right => Some(MouseButton::Right),
        Button::Middle => Some(MouseButton::Middle),
        Button::Unknown(_) => None,
    }
}

/// Platform-neutral identifier for an `rdev` key.
///
/// Printable keys map to their unshifted character; everything else to
/// `Key.<name>`. Unmapped keys become `<code>`.
pub fn key_name(key: Key) -> String {
    let name = match key {
        Key::KeyA => "a",
        Key::KeyB => "b",
        Key::KeyC => "c",
        Key::KeyD => "d",
        Key::KeyE => "e",
        Key::KeyF => "f",
        Key::KeyG => "g",
        Key::KeyH => "h",
        Key::KeyI => "i",
        Key::KeyJ => "j",
        Key::KeyK => "k",
        Key::KeyL => "l",
        Key::KeyM => "m",
        Key::KeyN => "n",
        Key::KeyO => "o",
        Key::KeyP => "p",
        Key::KeyQ => "q",
        Key::KeyR => "r",
        Key::KeyS => "s",
        Key::KeyT => "t",
        Key::KeyU => "u",
        Key::KeyV => "v",
        Key::KeyW => "w",
        Key::KeyX => "x",
        Key::KeyY => "y",
        Key::KeyZ => "z",
        Key::Num0 | Key::Kp0 => "0",
        Key::Num1 | Key::Kp1 => "1",
        Key::Num2 | Key::Kp2 => "2",
        Key::Num3 | Key::Kp3 => "3",
        Key::Num4 | Key::Kp4 => "4",
        Key::Num5 | Key::Kp5 => "5",
        Key::Num6 | Key::Kp6 => "6",
        Key::Num7 | Key::Kp7 => "7",
        Key::Num8 | Key::Kp8 => "8",
        Key::Num9 | Key::Kp9 => "9",
        Key::BackQuote => "`",
        Key::Minus | Key::KpMinus => "-",
        Key::Equal => "=",
        Key::KpPlus => "+",
        Key::KpMultiply => "*",
        Key::KpDivide => "/",
        Key::LeftBracket => "[",
        Key::RightBracket => "]",
        Key::SemiColon => ";",
        Key::Quote => "'",
        Key::BackSlash | Key::IntlBackslash => "\\",
        Key::Comma => ",",
        Key::Dot => ".",
        Key::Slash => "/",
        Key::Alt => "Key.alt",
        Key::AltGr => "Key.alt_gr",
        Key::Backspace => "Key.backspace",
        Key::CapsLock => "Key.caps_lock",
        Key::ControlLeft => "Key.ctrl_l",
        Key::ControlRight => "Key.ctrl_r",
        Key::Delete | Key::KpDelete => "Key.delete",
        Key::DownArrow => "Key.down",
        Key::End => "Key.end",
        Key::Escape => "Key.esc",
        Key::F1 => "Key.f1",
        Key::F2 => "Key.f2",
        Key::F3 => "Key.f3",
        Key::F4 => "Key.f4",
        Key::F5 => "Key.f5",
        Key::F6 => "Key.f6",
        Key::F7 => "Key.f7",
        Key::F8 => "Key.f8",
        Key::F9 => "Key.f9",
        Key::F10 => "Key.f10",
        Key::F11 => "Key.f11",
        Key::F12 => "Key.f12",
        Key::Home => "Key.home",
        Key::LeftArrow => "Key.left",
        Key::MetaLeft => "Key.cmd",
        Key::MetaRight => "Key.cmd_r",
        Key::PageDown => "Key.page_down",
        Key::PageUp => "Key.page_up",
        Key::Return | Key::KpReturn => "Key.enter",
        Key::RightArrow => "Key.right",
        Key::ShiftLeft => "Key.shift",
        Key::ShiftRight => "Key.shift_r",
        Key::Space => "Key.space",
        Key::Tab => "Key.tab",
        Key::UpArrow => "Key.up",
        Key::PrintScreen => "Key.print_screen",
        Key::ScrollLock => "Key.scroll_lock",
        Key::Pause => "Key.pause",
        Key::NumLock => "Key.num_lock",
        Key::Insert => "Key.insert",
        Key::Function => "Key.fn",
        Key::Unknown(code) => return format!("<{}>", code),
    };
    name.to_string()
}
