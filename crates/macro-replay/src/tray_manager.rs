//! System tray icon with state-based updates.
//!
//! Shows whether the app is idle, recording or playing and offers the
//! record, play, loop, stop, open-folder and exit actions.

use crate::{AppError, AppResult, TrayIconState};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

/// Identifiers of the tray menu entries. `Send`, unlike the menu itself.
#[derive(Debug, Clone)]
pub struct MenuIds {
    /// Start or stop recording.
    pub toggle_recording: MenuId,
    /// Play the current macro with the configured repeat count.
    pub play: MenuId,
    /// Loop the current macro until stopped.
    pub loop_play: MenuId,
    /// Cancel the running playback.
    pub stop_playback: MenuId,
    /// Open the macros directory in the file manager.
    pub open_folder: MenuId,
    /// Quit.
    pub exit: MenuId,
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    toggle_recording: MenuItem,
    play: MenuItem,
    loop_play: MenuItem,
    stop_playback: MenuItem,
    ids: MenuIds,
}

impl TrayManager {
    /// Create a new tray manager in the idle state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let toggle_recording = MenuItem::new("Start Recording", true, None);
        let play = MenuItem::new("Play Last", true, None);
        let loop_play = MenuItem::new("Loop Last", true, None);
        let stop_playback = MenuItem::new("Stop Playback", false, None);
        let open_folder = MenuItem::new("Open Macros Folder", true, None);
        let exit = MenuItem::new("Exit", true, None);

        let ids = MenuIds {
            toggle_recording: toggle_recording.id().clone(),
            play: play.id().clone(),
            loop_play: loop_play.id().clone(),
            stop_playback: stop_playback.id().clone(),
            open_folder: open_folder.id().clone(),
            exit: exit.id().clone(),
        };

        menu.append_items(&[
            &toggle_recording,
            &PredefinedMenuItem::separator(),
            &play,
            &loop_play,
            &stop_playback,
            &PredefinedMenuItem::separator(),
            &open_folder,
            &exit,
        ])
        .map_err(|e| AppError::TrayError {
            reason: format!("Failed to build tray menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let icon = Self::load_icon(TrayIconState::Idle)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(Self::tooltip(TrayIconState::Idle))
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            toggle_recording,
            play,
            loop_play,
            stop_playback,
            ids,
        })
    }

    /// Update icon, tooltip and which menu entries are usable.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: TrayIconState) -> AppResult<()> {
        let icon = Self::load_icon(state)?;

        self.tray_icon
            .set_icon(Some(icon))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(Self::tooltip(state)))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let idle = state == TrayIconState::Idle;
        self.toggle_recording.set_text(if state == TrayIconState::Recording {
            "Stop Recording"
        } else {
            "Start Recording"
        });
        self.toggle_recording
            .set_enabled(state != TrayIconState::Playing);
        self.play.set_enabled(idle);
        self.loop_play.set_enabled(idle);
        self.stop_playback
            .set_enabled(state == TrayIconState::Playing);

        Ok(())
    }

    /// Menu entry identifiers, for matching `MenuEvent`s off the main thread.
    pub fn menu_ids(&self) -> &MenuIds {
        &self.ids
    }

    fn tooltip(state: TrayIconState) -> &'static str {
        match state {
            TrayIconState::Idle => "Macro Replay - Ready",
            TrayIconState::Recording => "Macro Replay - Recording...",
            TrayIconState::Playing => "Macro Replay - Playing...",
        }
    }

    /// Load icon from compile-time embedded PNG bytes.
    #[track_caller]
    fn load_icon(state: TrayIconState) -> AppResult<Icon> {
        let png_bytes: &[u8] = match state {
            TrayIconState::Idle => include_bytes!("../resources/icons/idle.png"),
            TrayIconState::Recording => include_bytes!("../resources/icons/recording.png"),
            TrayIconState::Playing => include_bytes!("../resources/icons/playing.png"),
        };

        let img = image::load_from_memory(png_bytes).map_err(|e| AppError::TrayError {
            reason: format!("Failed to decode embedded icon: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let rgba = img.into_rgba8();
        let (width, height) = (rgba.width(), rgba.height());

        Icon::from_rgba(rgba.into_raw(), width, height).map_err(|e| AppError::TrayError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
