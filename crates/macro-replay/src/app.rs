use crate::{
    AppCommand, AppError, AppResult, AppState, MenuIds, Notifier, TrayIconState, UiCommand,
    config::Config,
};

use std::{panic::Location, sync::Arc, time::Instant};

use error_location::ErrorLocation;
use macro_replay_core::{MacroEngine, PlaybackOutcome};
use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::MenuEvent;
use uuid::Uuid;

/// Main application state.
///
/// Runs on the async runtime thread. Tray and hotkey-registration changes go
/// back to the main thread through `ui_proxy` because `TrayIcon` is `!Send`
/// and must remain on the UI thread.
pub struct App {
    pub(crate) engine: Arc<MacroEngine>,
    pub(crate) ui_proxy: EventLoopProxy<UiCommand>,
    pub(crate) config: Config,
    pub(crate) notifier: Notifier,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) menu_ids: MenuIds,
    pub(crate) state: AppState,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!(macros_dir = ?self.engine.store().dir(), "Macro Replay starting");

        // Tray event forwarding via single persistent blocking task.
        // Shutdown: when tray_event_rx is dropped, blocking_send() fails and
        // the task exits.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    if let Err(e) = self.handle_tray_event(event).await {
                        error!(error = ?e, "Failed to handle tray event");
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    if !self.handle_command(cmd) {
                        break;
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(tray_event_rx);

        match tokio::time::timeout(std::time::Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = self.shutdown_tx.send(true);
        info!("Macro Replay shut down successfully");

        Ok(())
    }

    /// Apply one command. Returns `false` once the app should stop.
    fn handle_command(&mut self, cmd: AppCommand) -> bool {
        match cmd {
            AppCommand::ToggleRecording => self.toggle_recording(),
            AppCommand::Play { looping } => self.start_playback(looping),
            AppCommand::StopPlayback => self.stop_playback(),
            AppCommand::PlaybackFinished { session_id, result } => {
                self.finish_playback(session_id, result);
            }
            AppCommand::Shutdown => {
                info!("Shutdown requested");
                self.wind_down();
                self.ui_or_log(UiCommand::Shutdown);
                return false;
            }
        }
        true
    }

    /// Start recording when idle, stop and save when recording.
    #[instrument(skip(self))]
    fn toggle_recording(&mut self) {
        match self.state {
            AppState::Idle => {
                if let Err(e) = self.start_recording() {
                    error!(error = %e, "Failed to start recording");
                    self.notifier.notify("Recording failed", &e.to_string());
                }
            }
            AppState::Recording { .. } => self.stop_recording(),
            AppState::Playing { session_id, .. } => {
                warn!(session_id = %session_id, "Cannot record while a macro is playing");
            }
        }
    }

    #[track_caller]
    fn start_recording(&mut self) -> AppResult<()> {
        self.engine.start_recording()?;

        let session_id = Uuid::new_v4();
        self.state = AppState::Recording {
            started_at: Instant::now(),
            session_id,
        };
        self.ui(UiCommand::SetState(TrayIconState::Recording))?;

        info!(session_id = %session_id, "Recording started");
        Ok(())
    }

    fn stop_recording(&mut self) {
        let (started_at, session_id) = match self.state {
            AppState::Recording {
                started_at,
                session_id,
            } => (started_at, session_id),
            _ => return,
        };

        let stopped = self.engine.stop_recording();
        self.state = AppState::Idle;
        self.ui_or_log(UiCommand::SetState(TrayIconState::Idle));

        match stopped {
            Ok(stopped) => {
                info!(
                    session_id = %session_id,
                    duration_ms = started_at.elapsed().as_millis() as u64,
                    event_count = stopped.recorded.len(),
                    saved = stopped.saved_to.is_some(),
                    "Recording stopped"
                );
                match &stopped.saved_to {
                    Some(path) => self.notifier.notify(
                        "Macro saved",
                        &format!("{}\n{}", stopped.recorded.summary(), path.display()),
                    ),
                    None if stopped.recorded.is_empty() => {
                        self.notifier.notify("Nothing recorded", "No input was captured")
                    }
                    None => self.notifier.notify(
                        "Macro not saved",
                        "The recording is kept in memory; see the log for details",
                    ),
                }
            }
            Err(e) => error!(session_id = %session_id, error = %e, "Failed to stop recording"),
        }
    }

    /// Replay the current macro on a blocking task.
    #[instrument(skip(self))]
    fn start_playback(&mut self, looping: bool) {
        if self.state != AppState::Idle {
            warn!(state = ?self.state, "Playback requested while busy");
            return;
        }

        let session_id = Uuid::new_v4();
        let options = self.config.playback.options(looping);

        self.ui_or_log(UiCommand::ArmStopHotkeys);
        self.ui_or_log(UiCommand::SetState(TrayIconState::Playing));
        self.state = AppState::Playing {
            started_at: Instant::now(),
            session_id,
            looping,
        };

        let engine = Arc::clone(&self.engine);
        let command_tx = self.command_tx.clone();

        tokio::spawn(async move {
            let joined = tokio::task::spawn_blocking(move || engine.play_current(&options)).await;

            let result = match joined {
                Ok(played) => played.map_err(|e| e.to_string()),
                Err(e) => Err(format!("Playback task failed: {}", e)),
            };

            if let Err(e) = command_tx
                .send(AppCommand::PlaybackFinished { session_id, result })
                .await
            {
                error!(session_id = %session_id, error = %e, "Failed to report playback end");
            }
        });

        info!(session_id = %session_id, looping, speed = options.speed, "Playback started");
    }

    fn stop_playback(&self) {
        match self.engine.stop_playback() {
            Ok(()) => debug!("Playback stop requested from menu"),
            Err(e) => warn!(error = %e, "Stop requested with no playback running"),
        }
    }

    fn finish_playback(&mut self, session_id: Uuid, result: Result<PlaybackOutcome, String>) {
        if self.state.session_id() != Some(session_id) {
            debug!(session_id = %session_id, "Ignoring end of a stale playback");
            return;
        }

        let started_at = match self.state {
            AppState::Playing { started_at, .. } => started_at,
            _ => Instant::now(),
        };

        self.state = AppState::Idle;
        self.ui_or_log(UiCommand::DisarmStopHotkeys);
        self.ui_or_log(UiCommand::SetState(TrayIconState::Idle));

        match result {
            Ok(outcome) => info!(
                session_id = %session_id,
                duration_ms = started_at.elapsed().as_millis() as u64,
                passes = outcome.passes_completed,
                events = outcome.events_injected,
                cancelled = outcome.is_cancelled(),
                "Playback ended"
            ),
            Err(reason) => {
                error!(session_id = %session_id, error = %reason, "Playback failed");
                self.notifier.notify("Playback failed", &reason);
            }
        }
    }

    /// Leave nothing running: save an open recording, cancel a playback.
    fn wind_down(&mut self) {
        match self.state {
            AppState::Recording { .. } => self.stop_recording(),
            AppState::Playing { .. } => self.stop_playback(),
            AppState::Idle => {}
        }
    }

    /// Handle tray menu events.
    #[instrument(skip(self))]
    async fn handle_tray_event(&mut self, event: MenuEvent) -> AppResult<()> {
        let ids = self.menu_ids.clone();
        let event_id = &event.id;

        let command = if *event_id == ids.toggle_recording {
            Some(AppCommand::ToggleRecording)
        } else if *event_id == ids.play {
            Some(AppCommand::Play { looping: false })
        } else if *event_id == ids.loop_play {
            Some(AppCommand::Play { looping: true })
        } else if *event_id == ids.stop_playback {
            Some(AppCommand::StopPlayback)
        } else {
            None
        };

        if let Some(command) = command {
            self.handle_command(command);
        } else if *event_id == ids.open_folder {
            let dir = self.engine.store().dir().to_path_buf();
            open::that(&dir)?;
            info!(dir = ?dir, "Opened macros folder");
        } else if *event_id == ids.exit {
            info!("Exit requested from tray menu");
            self.command_tx
                .send(AppCommand::Shutdown)
                .await
                .map_err(|e| AppError::ChannelSendFailed {
                    message: format!("Failed to send shutdown command: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }

        Ok(())
    }

    #[track_caller]
    fn ui(&self, command: UiCommand) -> AppResult<()> {
        self.ui_proxy
            .send_event(command)
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?} to UI thread: {}", command, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    fn ui_or_log(&self, command: UiCommand) {
        if let Err(e) = self.ui(command) {
            error!(error = %e, "UI thread unreachable");
        }
    }
}
