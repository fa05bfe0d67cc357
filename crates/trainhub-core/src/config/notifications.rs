//! Revocation notification configuration.

use serde::{Deserialize, Serialize};

/// Settings for the revocation notification dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Interval in seconds between dispatcher polls for unsent events.
    pub poll_interval_seconds: u64,
    /// Maximum delivery attempts before an event is flagged for operators.
    pub max_attempts: u32,
    /// Number of notifications sent concurrently per drain pass.
    pub send_concurrency: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 30,
            max_attempts: 5,
            send_concurrency: 4,
        }
    }
}
