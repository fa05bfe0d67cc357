//! User role.

use serde::{Deserialize, Serialize};

/// The role a user plays in the sharing relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Owns folders and controls who may access them.
    Athlete,
    /// Receives time-bounded, revocable access to folders.
    Coach,
}

impl UserRole {
    /// Whether this role can own folders.
    pub fn can_own_folders(&self) -> bool {
        matches!(self, Self::Athlete)
    }
}
