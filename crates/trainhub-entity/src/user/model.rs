//! User entity model.

use serde::{Deserialize, Serialize};

use trainhub_core::types::UserId;

use super::role::UserRole;

/// A registered user in the TrainHub directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Human-readable display name.
    pub name: String,
    /// User role.
    pub role: UserRole,
}

impl User {
    /// Check if this user is an athlete.
    pub fn is_athlete(&self) -> bool {
        self.role == UserRole::Athlete
    }

    /// Check if this user is a coach.
    pub fn is_coach(&self) -> bool {
        self.role == UserRole::Coach
    }
}
