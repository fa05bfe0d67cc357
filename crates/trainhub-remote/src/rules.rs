//! Server-side security rules for the remote authority.
//!
//! These checks run inside every backend, independent of client trust.
//! A client that skips its own guards still cannot mutate an expired or
//! processed invitation, alter a revocation record, or comment without
//! the capability.

use chrono::{DateTime, Utc};

use trainhub_core::error::AppError;
use trainhub_core::result::AppResult;
use trainhub_core::types::{CoachId, UserId};
use trainhub_entity::folder::SharedFolder;
use trainhub_entity::invitation::CoachInvitation;

/// Whether the invitation's read/write window is still open.
pub fn invitation_window_open(invitation: &CoachInvitation, now: DateTime<Utc>) -> bool {
    now < invitation.expires_at
}

/// Gate for invitation mutation.
///
/// Refuses writes to terminal invitations and to invitations whose
/// window has closed, regardless of what the client claims.
pub fn ensure_invitation_mutable(
    invitation: &CoachInvitation,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if invitation.status.is_terminal() {
        return Err(AppError::invitation_already_processed(format!(
            "invitation {} already {:?}",
            invitation.id, invitation.status
        )));
    }
    if !invitation_window_open(invitation, now) {
        return Err(AppError::invitation_expired(format!(
            "invitation {} expired at {}",
            invitation.id, invitation.expires_at
        )));
    }
    Ok(())
}

/// Invariants a stored invitation must satisfy.
pub fn ensure_invitation_well_formed(invitation: &CoachInvitation) -> AppResult<()> {
    if invitation.expires_at <= invitation.created_at {
        return Err(AppError::validation(
            "invitation expiry must be after creation",
        ));
    }
    Ok(())
}

/// Invariants a stored folder must satisfy.
pub fn ensure_folder_well_formed(folder: &SharedFolder) -> AppResult<()> {
    if !folder.membership_consistent() {
        return Err(AppError::validation(
            "folder membership set and permission keys must match",
        ));
    }
    Ok(())
}

/// Comment-creation authorization: the requester is the folder owner, or
/// a member coach whose grant carries `can_comment`.
pub fn can_comment(folder: &SharedFolder, requester: UserId) -> bool {
    if folder.owner_athlete_id.as_uuid() == requester.as_uuid() {
        return true;
    }
    folder
        .permission_for(CoachId::from_uuid(requester.into_uuid()))
        .is_some_and(|p| p.can_comment)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use trainhub_core::error::ErrorKind;
    use trainhub_core::types::{AthleteId, FolderId, InvitationId};
    use trainhub_entity::folder::Permission;
    use trainhub_entity::invitation::InvitationStatus;

    use super::*;

    fn invitation(status: InvitationStatus, expires_in: Duration) -> CoachInvitation {
        let now = Utc::now();
        CoachInvitation {
            id: InvitationId::new(),
            athlete_id: AthleteId::new(),
            athlete_name: "Jane".to_string(),
            coach_email: "coach@example.com".to_string(),
            folder_id: FolderId::new(),
            folder_name: "Videos".to_string(),
            status,
            requested_permission: Permission::view_only(),
            created_at: now - Duration::hours(1),
            expires_at: now + expires_in,
        }
    }

    #[test]
    fn test_pending_open_invitation_is_mutable() {
        let inv = invitation(InvitationStatus::Pending, Duration::days(7));
        assert!(ensure_invitation_mutable(&inv, Utc::now()).is_ok());
    }

    #[test]
    fn test_terminal_invitation_refuses_mutation() {
        let inv = invitation(InvitationStatus::Declined, Duration::days(7));
        let err = ensure_invitation_mutable(&inv, Utc::now()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvitationAlreadyProcessed);
    }

    #[test]
    fn test_expired_window_refuses_mutation() {
        let inv = invitation(InvitationStatus::Pending, Duration::days(7));
        let err = ensure_invitation_mutable(&inv, inv.expires_at + Duration::seconds(1))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvitationExpired);
    }

    #[test]
    fn test_comment_authorization() {
        let athlete = AthleteId::new();
        let commenter = CoachId::new();
        let viewer = CoachId::new();
        let mut folder = SharedFolder::new("Videos", athlete);
        folder.add_member(
            commenter,
            Permission {
                can_upload: false,
                can_comment: true,
            },
        );
        folder.add_member(viewer, Permission::view_only());

        assert!(can_comment(&folder, athlete.into()));
        assert!(can_comment(&folder, commenter.into()));
        assert!(!can_comment(&folder, viewer.into()));
        assert!(!can_comment(&folder, UserId::new()));
    }

    #[test]
    fn test_well_formed_checks() {
        let mut inv = invitation(InvitationStatus::Pending, Duration::days(7));
        assert!(ensure_invitation_well_formed(&inv).is_ok());
        inv.expires_at = inv.created_at;
        assert!(ensure_invitation_well_formed(&inv).is_err());

        let mut folder = SharedFolder::new("Videos", AthleteId::new());
        assert!(ensure_folder_well_formed(&folder).is_ok());
        folder.shared_with_coach_ids.insert(CoachId::new());
        assert!(ensure_folder_well_formed(&folder).is_err());
    }
}
