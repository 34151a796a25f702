//! Stop-hotkey monitoring during playback.
//!
//! Hotkey registration needs a thread with a message pump, which the engine
//! does not own. The application registers [`StopHotkeys`] with
//! `global-hotkey` and forwards the ids of pressed hotkeys into a channel;
//! [`HotkeyMonitor`] consumes that channel while a playback runs.

use crate::player::CancelFlag;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use tracing::{debug, info, warn};

/// How often an armed monitor checks whether it was disarmed.
const DISARM_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// The two combinations that stop a playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopHotkeys {
    /// Modifier + letter combination.
    pub chord: HotKey,
    /// Single key.
    pub single: HotKey,
}

impl StopHotkeys {
    /// Both hotkeys, for registration.
    pub fn hotkeys(&self) -> [HotKey; 2] {
        [self.chord, self.single]
    }

    /// Whether `id` belongs to either hotkey.
    pub fn matches(&self, id: u32) -> bool {
        id == self.chord.id() || id == self.single.id()
    }
}

impl Default for StopHotkeys {
    /// Ctrl+S and Escape.
    fn default() -> Self {
        Self {
            chord: HotKey::new(Some(Modifiers::CONTROL), Code::KeyS),
            single: HotKey::new(None, Code::Escape),
        }
    }
}

/// Turns stop-hotkey presses into a cancellation signal.
pub struct HotkeyMonitor {
    bindings: StopHotkeys,
    presses: Receiver<u32>,
}

impl HotkeyMonitor {
    /// Create a monitor reading pressed hotkey ids from `presses`.
    pub fn new(bindings: StopHotkeys, presses: Receiver<u32>) -> Self {
        Self { bindings, presses }
    }

    /// Configured hotkeys.
    pub fn bindings(&self) -> StopHotkeys {
        self.bindings
    }

    /// Start watching for stop presses on behalf of `flag`.
    ///
    /// Presses queued before arming are discarded. The first matching press
    /// cancels `flag` and the monitor goes inert. Dropping the returned guard
    /// tears the monitor down.
    pub fn arm(&self, flag: CancelFlag) -> MonitorGuard {
        let stale = self.presses.try_iter().count();
        if stale > 0 {
            debug!(stale, "Discarded hotkey presses from before playback");
        }

        let disarmed = Arc::new(AtomicBool::new(false));
        let presses = self.presses.clone();
        let bindings = self.bindings;
        let watch_disarmed = Arc::clone(&disarmed);

        let handle = thread::Builder::new()
            .name("stop-hotkey-monitor".to_string())
            .spawn(move || watch(bindings, presses, flag, watch_disarmed));

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "Failed to start stop-hotkey monitor");
                None
            }
        };

        MonitorGuard { disarmed, handle }
    }
}

fn watch(bindings: StopHotkeys, presses: Receiver<u32>, flag: CancelFlag, disarmed: Arc<AtomicBool>) {
    while !disarmed.load(Ordering::Acquire) {
        match presses.recv_timeout(DISARM_POLL_INTERVAL) {
            Ok(id) if bindings.matches(id) => {
                if flag.cancel() {
                    info!(hotkey_id = id, "Stop hotkey pressed, cancelling playback");
                }
                return;
            }
            Ok(_) | Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Keeps a monitor armed. Dropping it disarms and joins the monitor thread.
pub struct MonitorGuard {
    disarmed: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Drop for MonitorGuard {
    fn drop(&mut self) {
        self.disarmed.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Stop-hotkey monitor thread panicked");
            }
        }
    }
}
