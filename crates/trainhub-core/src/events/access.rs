//! Access-control domain events.
//!
//! Emitted on a broadcast channel after every successful mutation so that
//! decoupled consumers (notification dispatch, UI glue) can react without
//! participating in the mutating transaction itself.

use serde::{Deserialize, Serialize};

use crate::types::{AthleteId, CoachId, FolderId, InvitationId, RevocationId};

/// Events related to folder access-control operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AccessEvent {
    /// A folder was created.
    FolderCreated {
        /// The new folder ID.
        folder_id: FolderId,
        /// The owning athlete.
        athlete_id: AthleteId,
    },
    /// A coach was invited to a folder.
    InvitationCreated {
        /// The new invitation ID.
        invitation_id: InvitationId,
        /// The folder being shared.
        folder_id: FolderId,
        /// The invited coach's email address.
        coach_email: String,
    },
    /// A coach accepted an invitation and was added to the folder.
    InvitationAccepted {
        /// The invitation ID.
        invitation_id: InvitationId,
        /// The folder that gained a member.
        folder_id: FolderId,
        /// The coach that joined.
        coach_id: CoachId,
    },
    /// A coach declined an invitation.
    InvitationDeclined {
        /// The invitation ID.
        invitation_id: InvitationId,
        /// The folder the invitation was for.
        folder_id: FolderId,
    },
    /// A member's permissions were updated.
    PermissionsUpdated {
        /// The folder.
        folder_id: FolderId,
        /// The affected coach.
        coach_id: CoachId,
    },
    /// A coach's access was revoked.
    Revoked {
        /// The appended revocation event record.
        revocation_id: RevocationId,
        /// The folder that lost a member.
        folder_id: FolderId,
        /// The removed coach.
        coach_id: CoachId,
    },
}
