//! Invitation policy configuration.

use serde::{Deserialize, Serialize};

/// Coach invitation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InvitationsConfig {
    /// Number of days before a pending invitation expires.
    pub expiry_days: i64,
}

impl Default for InvitationsConfig {
    fn default() -> Self {
        Self { expiry_days: 7 }
    }
}
