use crate::TrayIconState;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`) and the
/// `GlobalHotKeyManager` (hotkey registration needs its message pump), so all
/// tray mutations, hotkey registration changes and process lifecycle events
/// flow through this enum.
#[derive(Debug, Clone, Copy)]
pub enum UiCommand {
    /// Update the tray icon to a new state.
    SetState(TrayIconState),
    /// Register the stop hotkeys for the duration of a playback.
    ArmStopHotkeys,
    /// Unregister the stop hotkeys once playback has ended.
    DisarmStopHotkeys,
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
