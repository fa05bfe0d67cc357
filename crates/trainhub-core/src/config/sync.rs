//! Background sync configuration.

use serde::{Deserialize, Serialize};

/// Sync coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Initial backoff after a failed sync pass, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound for the exponential backoff, in milliseconds.
    pub max_backoff_ms: u64,
    /// Multiplier applied to the backoff after each consecutive failure.
    pub backoff_multiplier: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 1_000,
            max_backoff_ms: 60_000,
            backoff_multiplier: 2,
        }
    }
}
