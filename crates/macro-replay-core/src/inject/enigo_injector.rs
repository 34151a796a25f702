use crate::{
    EngineError, EngineResult,
    inject::{InjectionError, InputInjector},
    model::{Event, MouseButton},
};

use std::panic::Location;

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// Injects events through `enigo`.
///
/// Keeps track of every key and button it pressed. Whatever is still held when
/// the injector is dropped (for example because playback was cancelled between
/// a press and its release) is released on drop, best effort, so a cancelled
/// macro never leaves the keyboard with a stuck modifier.
pub struct EnigoInjector {
    enigo: Enigo,
    held_keys: Vec<Key>,
    held_buttons: Vec<Button>,
}

impl EnigoInjector {
    /// Open the platform injection backend.
    #[track_caller]
    #[instrument]
    pub fn new() -> EngineResult<Self> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| EngineError::InjectorUnavailable {
                reason: format!("Failed to create Enigo: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            enigo,
            held_keys: Vec::new(),
            held_buttons: Vec::new(),
        })
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), InjectionError> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| InjectionError::new(format!("Failed to move pointer: {}", e)))
    }

    fn set_button(&mut self, button: MouseButton, pressed: bool) -> Result<(), InjectionError> {
        let button = match button {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
            MouseButton::Middle => Button::Middle,
        };
        let direction = if pressed {
            Direction::Press
        } else {
            Direction::Release
        };

        self.enigo
            .button(button, direction)
            .map_err(|e| InjectionError::new(format!("Failed to set {:?}: {}", button, e)))?;

        if pressed {
            self.held_buttons.push(button);
        } else {
            self.held_buttons.retain(|held| *held != button);
        }
        Ok(())
    }

    fn scroll(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        // Recorded deltas are positive up; enigo scrolls down for positive lengths.
        if dy != 0 {
            self.enigo
                .scroll(-dy, Axis::Vertical)
                .map_err(|e| InjectionError::new(format!("Failed to scroll: {}", e)))?;
        }
        if dx != 0 {
            self.enigo
                .scroll(dx, Axis::Horizontal)
                .map_err(|e| InjectionError::new(format!("Failed to scroll: {}", e)))?;
        }
        Ok(())
    }

    fn set_key(&mut self, name: &str, pressed: bool) -> Result<(), InjectionError> {
        let key = enigo_key(name)
            .ok_or_else(|| InjectionError::new(format!("Unsupported key '{}'", name)))?;
        let direction = if pressed {
            Direction::Press
        } else {
            Direction::Release
        };

        self.enigo
            .key(key, direction)
            .map_err(|e| InjectionError::new(format!("Failed to set key '{}': {}", name, e)))?;

        if pressed {
            self.held_keys.push(key);
        } else {
            self.held_keys.retain(|held| *held != key);
        }
        Ok(())
    }
}

impl InputInjector for EnigoInjector {
    fn inject(&mut self, event: &Event) -> Result<(), InjectionError> {
        match event {
            Event::MouseMove { x, y, .. } => self.move_to(*x, *y),
            Event::MouseClick {
                x,
                y,
                button,
                pressed,
                ..
            } => {
                self.move_to(*x, *y)?;
                self.set_button(*button, *pressed)
            }
            Event::MouseScroll { x, y, dx, dy, .. } => {
                self.move_to(*x, *y)?;
                self.scroll(*dx, *dy)
            }
            Event::KeyPress { key, .. } => self.set_key(key, true),
            Event::KeyRelease { key, .. } => self.set_key(key, false),
        }
    }
}

impl Drop for EnigoInjector {
    fn drop(&mut self) {
        if !self.held_keys.is_empty() || !self.held_buttons.is_empty() {
            debug!(
                keys = self.held_keys.len(),
                buttons = self.held_buttons.len(),
                "Releasing inputs left held by playback"
            );
        }
        for key in self.held_keys.drain(..).rev() {
            let _ = self.enigo.key(key, Direction::Release);
        }
        for button in self.held_buttons.drain(..).rev() {
            let _ = self.enigo.button(button, Direction::Release);
        }
    }
}

/// Resolve a platform-neutral key identifier to an `enigo` key.
///
/// Accepts single characters, `Key.<name>` names and `<code>` raw codes.
pub fn enigo_key(name: &str) -> Option<Key> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(Key::Unicode(c));
    }

    if let Some(code) = name.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        return code.parse().ok().map(Key::Other);
    }

    let key = match name.strip_prefix("Key.")? {
        "alt" | "alt_l" | "alt_r" | "alt_gr" => Key::Alt,
        "backspace" => Key::Backspace,
        "caps_lock" => Key::CapsLock,
        "cmd" | "cmd_l" | "cmd_r" => Key::Meta,
        "ctrl" | "ctrl_l" | "ctrl_r" => Key::Control,
        "delete" => Key::Delete,
        "down" => Key::DownArrow,
        "end" => Key::End,
        "enter" => Key::Return,
        "esc" => Key::Escape,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        "f13" => Key::F13,
        "f14" => Key::F14,
        "f15" => Key::F15,
        "f16" => Key::F16,
        "f17" => Key::F17,
        "f18" => Key::F18,
        "f19" => Key::F19,
        "f20" => Key::F20,
        "home" => Key::Home,
        "left" => Key::LeftArrow,
        "media_next" => Key::MediaNextTrack,
        "media_play_pause" => Key::MediaPlayPause,
        "media_previous" => Key::MediaPrevTrack,
        "media_volume_down" => Key::VolumeDown,
        "media_volume_mute" => Key::VolumeMute,
        "media_volume_up" => Key::VolumeUp,
        "page_down" => Key::PageDown,
        "page_up" => Key::PageUp,
        "right" => Key::RightArrow,
        "shift" | "shift_l" | "shift_r" => Key::Shift,
        "space" => Key::Space,
        "tab" => Key::Tab,
        "up" => Key::UpArrow,
        other => return platform_key(other),
    };
    Some(key)
}

/// Keys `enigo` only names on some platforms. Elsewhere the nearest native
/// code is sent through `Key::Other`.
fn platform_key(name: &str) -> Option<Key> {
    #[cfg(not(target_os = "macos"))]
    let key = match name {
        "insert" => Key::Insert,
        #[cfg(target_os = "windows")]
        "menu" => Key::Apps,
        // XK_Menu
        #[cfg(not(target_os = "windows"))]
        "menu" => Key::Other(0xFF67),
        "num_lock" => Key::Numlock,
        "pause" => Key::Pause,
        "print_screen" => Key::PrintScr,
        #[cfg(target_os = "windows")]
        "scroll_lock" => Key::Scroll,
        #[cfg(not(target_os = "windows"))]
        "scroll_lock" => Key::ScrollLock,
        // No virtual key exists for Fn; 0xFF is reserved and ignored.
        #[cfg(target_os = "windows")]
        "fn" => Key::Other(0xFF),
        // XF86XK_Fn
        #[cfg(not(target_os = "windows"))]
        "fn" => Key::Other(0x1008_11D0),
        _ => return None,
    };

    // macOS keyboards have no insert, lock or pause keys; Apple maps them to
    // Help and F13 to F15, and num lock to the keypad Clear key.
    #[cfg(target_os = "macos")]
    let key = match name {
        "fn" => Key::Function,
        "insert" => Key::Other(0x72),
        "menu" => Key::Other(0x6E),
        "num_lock" => Key::Other(0x47),
        "pause" => Key::Other(0x71),
        "print_screen" => Key::Other(0x69),
        "scroll_lock" => Key::Other(0x6B),
        _ => return None,
    };

    Some(key)
}
