//! Observed connection class, used to adapt bulk transfer concurrency.

use serde::{Deserialize, Serialize};

/// Coarse classification of the device's current network connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionClass {
    /// Metered or poor connectivity (e.g. weak cellular).
    Constrained,
    /// Typical connectivity.
    Standard,
    /// Fast, unmetered connectivity (e.g. local Wi-Fi).
    Fast,
}

impl Default for ConnectionClass {
    fn default() -> Self {
        Self::Standard
    }
}
