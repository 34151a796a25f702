use crate::{AppCommand, HotkeyHandler, hotkey_handler::HotkeyRoute};

use std::time::Duration;

use global_hotkey::{
    GlobalHotKeyEvent, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use macro_replay_core::StopHotkeys;
use tokio::sync::mpsc;

fn record_hotkey_id() -> u32 {
    HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyR).id()
}

fn handler() -> (
    HotkeyHandler,
    mpsc::Receiver<AppCommand>,
    crossbeam_channel::Receiver<u32>,
) {
    let (command_tx, command_rx) = mpsc::channel(8);
    let (stop_tx, stop_rx) = crossbeam_channel::unbounded();
    let handler = HotkeyHandler::new(
        record_hotkey_id(),
        StopHotkeys::default(),
        command_tx,
        stop_tx,
    );
    (handler, command_rx, stop_rx)
}

fn pressed(id: u32) -> GlobalHotKeyEvent {
    GlobalHotKeyEvent {
        id,
        state: HotKeyState::Pressed,
    }
}

/// WHAT: Pressing the record hotkey routes to ToggleRecording
/// WHY: CTRL+SHIFT+R is the only way to start and stop recording without the tray
#[test]
fn given_record_hotkey_when_pressed_then_routes_to_toggle() {
    // Given: A handler with the record hotkey registered
    let (handler, _command_rx, _stop_rx) = handler();

    // When: Routing a press of the record hotkey
    let route = handler.route(record_hotkey_id(), HotKeyState::Pressed);

    // Then: It toggles recording
    assert_eq!(route, HotkeyRoute::ToggleRecording);
}

/// WHAT: Releases never trigger anything
/// WHY: Each physical keystroke delivers a press and a release; acting on both would toggle twice
#[test]
fn given_record_hotkey_when_released_then_ignored() {
    // Given: A handler
    let (handler, _command_rx, _stop_rx) = handler();

    // When: Routing releases of the record and stop hotkeys
    let record = handler.route(record_hotkey_id(), HotKeyState::Released);
    let stop = handler.route(
        StopHotkeys::default().single.id(),
        HotKeyState::Released,
    );

    // Then: Both are ignored
    assert_eq!(record, HotkeyRoute::Ignore);
    assert_eq!(stop, HotkeyRoute::Ignore);
}

/// WHAT: Both stop hotkeys route to the stop monitor
/// WHY: Ctrl+S and Escape must each cancel a running playback
#[test]
fn given_stop_hotkeys_when_pressed_then_route_to_stop() {
    // Given: A handler with the default stop hotkeys
    let (handler, _command_rx, _stop_rx) = handler();
    let stop_hotkeys = StopHotkeys::default();

    // When: Routing presses of the chord and the single key
    let chord = handler.route(stop_hotkeys.chord.id(), HotKeyState::Pressed);
    let single = handler.route(stop_hotkeys.single.id(), HotKeyState::Pressed);

    // Then: Both reach the stop monitor
    assert_eq!(chord, HotkeyRoute::Stop);
    assert_eq!(single, HotkeyRoute::Stop);
}

/// WHAT: Unknown hotkey ids are ignored
/// WHY: Other applications' registrations must not reach the app
#[test]
fn given_unknown_hotkey_when_pressed_then_ignored() {
    // Given: A handler and an unrelated hotkey
    let (handler, _command_rx, _stop_rx) = handler();
    let other = HotKey::new(Some(Modifiers::ALT), Code::F9);

    // When: Routing a press of it
    let route = handler.route(other.id(), HotKeyState::Pressed);

    // Then: Nothing happens
    assert_eq!(route, HotkeyRoute::Ignore);
}

/// WHAT: Dispatching a record press sends ToggleRecording to the app
/// WHY: The app loop owns all state transitions
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_record_press_when_dispatched_then_app_receives_toggle() {
    // Given: A handler and its command receiver
    let (handler, mut command_rx, stop_rx) = handler();

    // When: Dispatching a press of the record hotkey
    handler.dispatch(pressed(record_hotkey_id())).await.unwrap();

    // Then: The app receives ToggleRecording and the stop channel stays empty
    let cmd = tokio::time::timeout(Duration::from_secs(1), command_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(cmd, AppCommand::ToggleRecording));
    assert!(stop_rx.try_recv().is_err());
}

/// WHAT: Dispatching a stop press forwards the hotkey id to the monitor channel
/// WHY: The engine's monitor cancels playback from that channel, not from the app loop
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stop_press_when_dispatched_then_id_forwarded_to_monitor() {
    // Given: A handler and the stop channel receiver
    let (handler, mut command_rx, stop_rx) = handler();
    let escape = StopHotkeys::default().single.id();

    // When: Dispatching a press of Escape
    handler.dispatch(pressed(escape)).await.unwrap();

    // Then: The id is forwarded and no app command is sent
    assert_eq!(stop_rx.try_recv().unwrap(), escape);
    assert!(command_rx.try_recv().is_err());
}

/// WHAT: Dispatch fails when the app loop is gone
/// WHY: A closed command channel must surface as an error, not vanish
#[tokio::test]
async fn given_closed_command_channel_when_record_pressed_then_dispatch_fails() {
    // Given: A handler whose command receiver is dropped
    let (handler, command_rx, _stop_rx) = handler();
    drop(command_rx);

    // When: Dispatching a record press
    let result = handler.dispatch(pressed(record_hotkey_id())).await;

    // Then: The send failure is reported
    assert!(result.is_err());
}
