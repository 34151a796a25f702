use crate::capture::RawInput;

use std::time::Duration;

/// Default minimum spacing between kept mouse-move samples.
pub const DEFAULT_MIN_MOVE_INTERVAL: Duration = Duration::from_millis(50);

/// Drops mouse-move samples that arrive faster than `min_interval`.
///
/// Clicks, scrolls and keys always pass.
#[derive(Debug, Clone)]
pub struct ThrottlePolicy {
    min_interval: Duration,
    last_move: Option<Duration>,
}

impl ThrottlePolicy {
    /// Create a policy with no move seen yet.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_move: None,
        }
    }

    /// Forget the last kept move.
    pub fn reset(&mut self) {
        self.last_move = None;
    }

    /// Configured interval.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Decide whether `input` captured at `at` is kept.
    pub fn admit(&mut self, input: &RawInput, at: Duration) -> bool {
        if !input.is_mouse_move() {
            return true;
        }

        let keep = self
            .last_move
            .is_none_or(|last| at.saturating_sub(last) >= self.min_interval);

        if keep {
            self.last_move = Some(at);
        }

        keep
    }
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MOVE_INTERVAL)
    }
}
