//! Macro Replay: record mouse and keyboard input, replay it from the tray.

mod app;
mod app_command;
mod app_state;
mod config;
mod error;
mod hotkey_handler;
mod logging;
mod notifier;
#[cfg(test)]
mod tests;
mod tray_icon_state;
mod tray_manager;
mod ui_command;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    app_state::AppState,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    notifier::Notifier,
    tray_icon_state::TrayIconState,
    tray_manager::{MenuIds, TrayManager},
    ui_command::UiCommand,
};

use crate::config::Config;

use std::sync::Arc;

use global_hotkey::GlobalHotKeyManager;
use macro_replay_core::{HotkeyMonitor, MacroEngine, MacroStore, StopHotkeys};
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

/// Application entry point.
fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let log_dir = Config::log_dir().ok();
    let log_guard = logging::init(log_dir.as_deref());

    let event_loop = EventLoopBuilder::<UiCommand>::with_user_event().build();
    let ui_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    let stop_hotkeys = StopHotkeys::default();

    // Persists across event loop iterations; dropping it unregisters every hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;
    let mut config = Some(config);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                match cmd {
                    UiCommand::SetState(state) => {
                        if let Err(e) = tray_manager.update_state(state) {
                            error!(error = ?e, "Failed to update tray icon");
                        }
                    }
                    UiCommand::ArmStopHotkeys | UiCommand::DisarmStopHotkeys => {
                        let armed = matches!(cmd, UiCommand::ArmStopHotkeys);
                        if let Some(manager) = &hotkey_manager {
                            if let Err(e) =
                                HotkeyHandler::set_stop_hotkeys(manager, stop_hotkeys, armed)
                            {
                                error!(error = ?e, armed, "Failed to update stop hotkeys");
                            }
                        }
                    }
                    UiCommand::Shutdown => {
                        *control_flow = ControlFlow::ExitWithCode(0);
                    }
                }
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let Some(config) = config.take() else {
                    return;
                };

                // Register hotkeys on the main thread: tao's event loop pumps
                // the Windows messages needed for WM_HOTKEY delivery.
                let (manager, record_hotkey_id) = match HotkeyHandler::register_record_hotkey() {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("Failed to register hotkey: {:?}", e);
                        std::process::exit(1);
                    }
                };
                hotkey_manager = Some(manager);

                let store = match MacroStore::new(&config.storage.macros_dir) {
                    Ok(store) => store,
                    Err(e) => {
                        error!("Failed to open macros directory: {:?}", e);
                        std::process::exit(1);
                    }
                };

                let (stop_tx, stop_rx) = crossbeam_channel::unbounded();
                let monitor = HotkeyMonitor::new(stop_hotkeys, stop_rx);
                let engine = Arc::new(MacroEngine::with_system_backends(
                    store,
                    Some(monitor),
                    config.engine(),
                ));

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                let (command_tx, command_rx) = mpsc::channel(32);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);

                let ui_proxy = ui_proxy.clone();
                let menu_ids = tray_manager.menu_ids().clone();
                let notifier = Notifier::new(config.behavior.notifications);

                info!(
                    macros_dir = ?config.storage.macros_dir,
                    speed = config.playback.speed,
                    repeat_count = config.playback.repeat_count,
                    notifications = notifier.enabled(),
                    "Engine ready"
                );

                // Spawn tokio runtime on separate thread.
                // TrayManager and hotkey_manager stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let hotkey_handler = HotkeyHandler::new(
                            record_hotkey_id,
                            stop_hotkeys,
                            command_tx.clone(),
                            stop_tx,
                        );

                        let app = App {
                            engine,
                            ui_proxy,
                            config,
                            notifier,
                            command_tx,
                            command_rx,
                            shutdown_tx,
                            menu_ids,
                            state: AppState::Idle,
                        };

                        tokio::join!(
                            async {
                                if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                                    error!(error = ?e, "Hotkey handler error");
                                }
                            },
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );
                    });
                });
            }
            _ => {}
        }

        // The event loop never returns: keep the log flusher and the hotkey
        // manager alive in the closure for the app's lifetime.
        let _ = (&log_guard, &hotkey_manager);
    });
}
