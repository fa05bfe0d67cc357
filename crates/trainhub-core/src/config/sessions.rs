//! Permission verification session configuration.

use serde::{Deserialize, Serialize};

/// Settings for the session-scoped permission grant cache.
///
/// A "session" is one open interaction with a folder: the grant obtained
/// when the folder is opened is reused until the interaction ends, then
/// re-verified on the next open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Time-to-live for a cached permission grant, in seconds.
    pub grant_ttl_seconds: u64,
    /// Maximum number of cached grants.
    pub max_grants: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            grant_ttl_seconds: 900,
            max_grants: 10_000,
        }
    }
}
