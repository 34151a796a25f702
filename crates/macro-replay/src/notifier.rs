//! Desktop notifications.

use notify_rust::Notification;
use tracing::{debug, warn};

const APP_NAME: &str = "Macro Replay";

/// Shows desktop notifications when enabled in the config.
#[derive(Debug, Clone, Copy)]
pub struct Notifier {
    enabled: bool,
}

impl Notifier {
    /// Create a notifier; a disabled one only logs.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Whether notifications are shown.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Show `summary` with `body`. Failures are logged, never returned.
    pub fn notify(&self, summary: &str, body: &str) {
        if !self.enabled {
            debug!(summary, "Notification suppressed");
            return;
        }

        if let Err(e) = Notification::new()
            .appname(APP_NAME)
            .summary(summary)
            .body(body)
            .show()
        {
            warn!(error = %e, summary, "Failed to show notification");
        }
    }
}
