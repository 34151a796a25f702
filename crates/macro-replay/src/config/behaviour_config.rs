use crate::config::default_notifications;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Whether to show desktop notifications for saves and failures.
    #[serde(default = "default_notifications")]
    pub notifications: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            notifications: default_notifications(),
        }
    }
}
