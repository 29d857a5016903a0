use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for a read-along session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet period after a manual scroll before autoscroll resumes
    /// Default: 1500 ms
    pub autoscroll_suppression_ms: u64,

    /// Capacity of the session's event channel
    pub event_buffer: usize,

    /// A view with no requests for this long is shut down
    /// Default: 600 s
    pub idle_timeout_secs: u64,
}

impl SessionConfig {
    pub fn suppression(&self) -> Duration {
        Duration::from_millis(self.autoscroll_suppression_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autoscroll_suppression_ms: 1500,
            event_buffer: 256,
            idle_timeout_secs: 600,
        }
    }
}
