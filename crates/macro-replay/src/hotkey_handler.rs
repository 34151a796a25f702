//! Global hotkey registration and routing.
//!
//! CTRL+SHIFT+R toggles recording for the whole lifetime of the app. The stop
//! hotkeys are registered only while a playback runs so Escape keeps working
//! in other applications. All presses arrive on the single global
//! [`GlobalHotKeyEvent`] channel; this handler is its only consumer and routes
//! each press either to the app or to the engine's stop-hotkey monitor.

use crate::{AppCommand, AppError, AppResult};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use macro_replay_core::StopHotkeys;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Where a hotkey press goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyRoute {
    /// Toggle recording.
    ToggleRecording,
    /// Forward to the stop-hotkey monitor.
    Stop,
    /// Not ours, or a release.
    Ignore,
}

/// Routes global hotkey presses.
pub struct HotkeyHandler {
    record_hotkey_id: u32,
    stop_hotkeys: StopHotkeys,
    command_tx: mpsc::Sender<AppCommand>,
    stop_tx: crossbeam_channel::Sender<u32>,
}

impl HotkeyHandler {
    /// Register CTRL+SHIFT+R as the record toggle.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_record_hotkey() -> AppResult<(GlobalHotKeyManager, u32)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let hotkey = HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyR);

        manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register CTRL+SHIFT+R: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = "CTRL+SHIFT+R", "Record hotkey registered");

        Ok((manager, hotkey.id()))
    }

    /// Register or unregister the stop hotkeys. Main thread only.
    #[track_caller]
    #[instrument(skip(manager))]
    pub fn set_stop_hotkeys(
        manager: &GlobalHotKeyManager,
        stop_hotkeys: StopHotkeys,
        armed: bool,
    ) -> AppResult<()> {
        let hotkeys = stop_hotkeys.hotkeys();
        let result = if armed {
            manager.register_all(&hotkeys)
        } else {
            manager.unregister_all(&hotkeys)
        };

        result.map_err(|e| AppError::HotkeyRegistrationFailed {
            reason: format!(
                "Failed to {} stop hotkeys: {}",
                if armed { "register" } else { "unregister" },
                e
            ),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(armed, "Stop hotkeys updated");
        Ok(())
    }

    /// Create a router for a previously registered record hotkey.
    pub fn new(
        record_hotkey_id: u32,
        stop_hotkeys: StopHotkeys,
        command_tx: mpsc::Sender<AppCommand>,
        stop_tx: crossbeam_channel::Sender<u32>,
    ) -> Self {
        Self {
            record_hotkey_id,
            stop_hotkeys,
            command_tx,
            stop_tx,
        }
    }

    /// Decide where a hotkey event goes. Releases are ignored.
    pub fn route(&self, id: u32, state: HotKeyState) -> HotkeyRoute {
        if state != HotKeyState::Pressed {
            HotkeyRoute::Ignore
        } else if id == self.record_hotkey_id {
            HotkeyRoute::ToggleRecording
        } else if self.stop_hotkeys.matches(id) {
            HotkeyRoute::Stop
        } else {
            HotkeyRoute::Ignore
        }
    }

    /// Run the hotkey handler event loop.
    ///
    /// This method blocks until a shutdown signal is received.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Single persistent blocking task that forwards hotkey events.
        // Shutdown: when event_rx is dropped, the next blocking_send() fails
        // and the task exits.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if let Err(e) = self.dispatch(event).await {
                        warn!(error = %e, "Failed to dispatch hotkey press");
                    }
                }
            }
        }

        drop(event_rx);

        // The blocking task may be stuck in recv() until the next hotkey
        // event; it is cleaned up by the runtime on process exit regardless.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    pub(crate) async fn dispatch(&self, event: GlobalHotKeyEvent) -> AppResult<()> {
        match self.route(event.id, event.state) {
            HotkeyRoute::ToggleRecording => {
                self.command_tx
                    .send(AppCommand::ToggleRecording)
                    .await
                    .map_err(|e| AppError::ChannelSendFailed {
                        message: format!("Failed to send ToggleRecording: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
                debug!("Record hotkey pressed");
            }
            HotkeyRoute::Stop => {
                self.stop_tx
                    .send(event.id)
                    .map_err(|e| AppError::ChannelSendFailed {
                        message: format!("Failed to forward stop hotkey: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
                debug!(hotkey_id = event.id, "Stop hotkey forwarded");
            }
            HotkeyRoute::Ignore => {}
        }
        Ok(())
    }
}
