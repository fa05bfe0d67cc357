//! Invitation lifecycle status.

use serde::{Deserialize, Serialize};

/// Status of a coach invitation.
///
/// Transitions only leave `Pending`, and only once. `Expired` is derived
/// by comparing the clock against the invitation's expiry, never written
/// as an explicit transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Awaiting a response from the invited coach.
    Pending,
    /// The coach accepted; folder membership was granted.
    Accepted,
    /// The coach declined.
    Declined,
    /// The expiry time passed while pending.
    Expired,
}

impl InvitationStatus {
    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}
