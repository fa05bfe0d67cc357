//! Revocation event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trainhub_core::types::{AthleteId, CoachId, FolderId, RevocationId};

/// An append-only record of a coach's access being revoked.
///
/// Never updated after creation except the `email_sent` flag, which flips
/// false→true exactly once when the notification side-effect completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationEvent {
    /// Unique revocation identifier.
    pub id: RevocationId,
    /// The folder access was revoked from.
    pub folder_id: FolderId,
    /// The folder's display name at revocation time.
    pub folder_name: String,
    /// The coach whose access was removed.
    pub coach_id: CoachId,
    /// The coach's email address, for the notification side-effect.
    pub coach_email: String,
    /// The athlete who revoked access.
    pub athlete_id: AthleteId,
    /// The athlete's display name at revocation time.
    pub athlete_name: String,
    /// When the revocation happened.
    pub revoked_at: DateTime<Utc>,
    /// Whether the notification email has been sent.
    pub email_sent: bool,
}

impl RevocationEvent {
    /// Build a new unsent revocation event.
    pub fn new(
        folder_id: FolderId,
        folder_name: impl Into<String>,
        coach_id: CoachId,
        coach_email: impl Into<String>,
        athlete_id: AthleteId,
        athlete_name: impl Into<String>,
    ) -> Self {
        Self {
            id: RevocationId::new(),
            folder_id,
            folder_name: folder_name.into(),
            coach_id,
            coach_email: coach_email.into(),
            athlete_id,
            athlete_name: athlete_name.into(),
            revoked_at: Utc::now(),
            email_sent: false,
        }
    }
}
