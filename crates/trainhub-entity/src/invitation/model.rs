//! Coach invitation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trainhub_core::types::{AthleteId, FolderId, InvitationId};

use crate::folder::Permission;

use super::status::InvitationStatus;

/// A time-bounded offer of folder access sent to a coach's email address.
///
/// Invariant: `expires_at > created_at`. The status leaves `Pending`
/// exactly once; a terminal invitation is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachInvitation {
    /// Unique invitation identifier.
    pub id: InvitationId,
    /// The inviting athlete.
    pub athlete_id: AthleteId,
    /// The inviting athlete's display name (denormalized for display).
    pub athlete_name: String,
    /// The invited coach's email address.
    pub coach_email: String,
    /// The folder being shared.
    pub folder_id: FolderId,
    /// The folder's display name (denormalized for display).
    pub folder_name: String,
    /// Lifecycle status.
    pub status: InvitationStatus,
    /// The permission the athlete offered; granted verbatim on acceptance.
    pub requested_permission: Permission,
    /// When the invitation was created.
    pub created_at: DateTime<Utc>,
    /// When the invitation expires.
    pub expires_at: DateTime<Utc>,
}

impl CoachInvitation {
    /// Whether the invitation's expiry time has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// The effective status at the given instant.
    ///
    /// A pending invitation whose window has closed reads as `Expired`
    /// without any stored transition.
    pub fn effective_status(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.status == InvitationStatus::Pending && self.is_expired(now) {
            InvitationStatus::Expired
        } else {
            self.status
        }
    }

    /// Whether the invitation can still be accepted or declined.
    pub fn is_actionable(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && !self.is_expired(now)
    }
}
