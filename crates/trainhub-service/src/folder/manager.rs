//! Shared folder manager.
//!
//! Every mutating operation is a short read-verify-write transaction
//! against the remote authority: re-read the target record, verify the
//! guards, commit a CAS write batch. No lock is held across a network
//! round trip; a `Conflict` triggers exactly one automatic re-read and
//! retry before surfacing to the caller. Successful commits are mirrored
//! into the local replica before returning.
//!
//! Mutations while offline fail fast with `NetworkUnavailable`; an
//! access-control decision is never queued for later replay. Read paths
//! degrade to the local replica instead.

use std::future::Future;
use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::StreamExt;
use tokio::sync::broadcast;
use tracing::{debug, info};
use validator::ValidateEmail;

use trainhub_core::config::{InvitationsConfig, TransferConfig};
use trainhub_core::error::{AppError, ErrorKind};
use trainhub_core::events::AccessEvent;
use trainhub_core::result::AppResult;
use trainhub_core::types::{AthleteId, CoachId, ConnectionClass, FolderId, InvitationId};
use trainhub_entity::folder::{Permission, SharedFolder};
use trainhub_entity::invitation::{CoachInvitation, InvitationStatus};
use trainhub_entity::revocation::RevocationEvent;
use trainhub_entity::user::User;
use trainhub_remote::authority::{RemoteAuthority, VersionedFolder, WriteBatch, WriteOp};
use trainhub_replica::LocalReplica;

/// Capacity of the access-event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Run a mutating transaction, retrying exactly once on `Conflict`.
async fn retry_once_on_conflict<T, F, Fut>(op: F) -> AppResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    match op().await {
        Err(e) if e.kind == ErrorKind::Conflict => {
            debug!("transaction conflicted, re-reading and retrying once");
            op().await
        }
        other => other,
    }
}

/// Domain operations on shared folders, invitations, and revocations.
pub struct SharedFolderManager {
    /// The canonical store.
    remote: Arc<dyn RemoteAuthority>,
    /// The device-resident replica, mirrored on every successful commit.
    replica: Arc<LocalReplica>,
    /// Invitation policy.
    invitations: InvitationsConfig,
    /// Bulk operation concurrency caps.
    transfer: TransferConfig,
    /// Broadcast channel for access events.
    events: broadcast::Sender<AccessEvent>,
}

impl SharedFolderManager {
    /// Creates a new manager.
    pub fn new(
        remote: Arc<dyn RemoteAuthority>,
        replica: Arc<LocalReplica>,
        invitations: InvitationsConfig,
        transfer: TransferConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            remote,
            replica,
            invitations,
            transfer,
            events,
        }
    }

    /// Subscribe to access events emitted after successful mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<AccessEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: AccessEvent) {
        // No receivers is fine; events are advisory.
        let _ = self.events.send(event);
    }

    async fn require_folder(&self, folder_id: FolderId) -> AppResult<VersionedFolder> {
        self.remote
            .fetch_folder(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("folder {folder_id}")))
    }

    async fn require_user(&self, id: impl Into<trainhub_core::types::UserId>) -> AppResult<User> {
        let id = id.into();
        self.remote
            .fetch_user(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {id} not in directory")))
    }

    // ── Folder lifecycle ───────────────────────────────────

    /// Create a folder with empty membership, owned by the athlete.
    pub async fn create_folder(
        &self,
        name: &str,
        owner_athlete_id: AthleteId,
    ) -> AppResult<FolderId> {
        if name.trim().is_empty() {
            return Err(AppError::validation("folder name must not be empty"));
        }
        let owner = self.require_user(owner_athlete_id).await?;
        if !owner.role.can_own_folders() {
            return Err(AppError::unauthorized("only athletes can own folders"));
        }

        let folder = SharedFolder::new(name.trim(), owner_athlete_id);
        let folder_id = folder.id;
        let receipt = self
            .remote
            .commit(WriteBatch::new().push(WriteOp::CreateFolder {
                folder: folder.clone(),
            }))
            .await?;

        if let Some(version) = receipt.folder_version(folder_id) {
            self.replica.apply_folder(folder, version);
        }
        self.emit(AccessEvent::FolderCreated {
            folder_id,
            athlete_id: owner_athlete_id,
        });
        info!(%folder_id, athlete_id = %owner_athlete_id, "folder created");
        Ok(folder_id)
    }

    /// Rename a folder. Touches only the profile field group, so it can
    /// never conflict with concurrent membership changes.
    pub async fn rename_folder(&self, folder_id: FolderId, new_name: &str) -> AppResult<()> {
        if new_name.trim().is_empty() {
            return Err(AppError::validation("folder name must not be empty"));
        }
        retry_once_on_conflict(|| self.try_rename_folder(folder_id, new_name)).await
    }

    async fn try_rename_folder(&self, folder_id: FolderId, new_name: &str) -> AppResult<()> {
        let current = self.require_folder(folder_id).await?;
        let mut folder = current.record;
        folder.name = new_name.trim().to_string();

        let receipt = self
            .remote
            .commit(WriteBatch::new().push(WriteOp::PutFolderProfile {
                folder: folder.clone(),
                expected: current.version.profile,
            }))
            .await?;

        if let Some(version) = receipt.folder_version(folder_id) {
            self.replica.apply_folder(folder, version);
        }
        info!(%folder_id, "folder renamed");
        Ok(())
    }

    /// Delete a folder entirely. Owner-initiated; invitations and
    /// revocation history are left in place as records.
    pub async fn delete_folder(&self, folder_id: FolderId) -> AppResult<()> {
        retry_once_on_conflict(|| self.try_delete_folder(folder_id)).await
    }

    async fn try_delete_folder(&self, folder_id: FolderId) -> AppResult<()> {
        let current = self.require_folder(folder_id).await?;
        self.remote
            .commit(WriteBatch::new().push(WriteOp::DeleteFolder {
                folder_id,
                expected: current.version,
            }))
            .await?;
        self.replica.remove_folder(folder_id);
        info!(%folder_id, "folder deleted");
        Ok(())
    }

    // ── Invitations ────────────────────────────────────────

    /// Invite a coach to a folder by email.
    ///
    /// Fails with `DuplicateInvitation` if a pending invitation already
    /// exists for the same (folder, email) pair. The invitation expires
    /// after the configured policy window.
    pub async fn invite_coach(
        &self,
        folder_id: FolderId,
        coach_email: &str,
        coach_name: &str,
        requested_permission: Permission,
    ) -> AppResult<InvitationId> {
        if !coach_email.validate_email() {
            return Err(AppError::validation(format!(
                "'{coach_email}' is not a valid email address"
            )));
        }

        let current = self.require_folder(folder_id).await?;
        let folder = current.record;

        if self
            .remote
            .find_pending_invitation(folder_id, coach_email)
            .await?
            .is_some()
        {
            return Err(AppError::duplicate_invitation(format!(
                "a pending invitation for {coach_email} already exists on folder {folder_id}"
            )));
        }

        let owner = self.require_user(folder.owner_athlete_id).await?;
        let now = Utc::now();
        let invitation = CoachInvitation {
            id: InvitationId::new(),
            athlete_id: folder.owner_athlete_id,
            athlete_name: owner.name,
            coach_email: coach_email.to_string(),
            folder_id,
            folder_name: folder.name.clone(),
            status: InvitationStatus::Pending,
            requested_permission,
            created_at: now,
            expires_at: now + Duration::days(self.invitations.expiry_days),
        };
        let invitation_id = invitation.id;

        let receipt = self
            .remote
            .commit(WriteBatch::new().push(WriteOp::CreateInvitation {
                invitation: invitation.clone(),
            }))
            .await?;

        if let Some(version) = receipt.invitation_version(invitation_id) {
            self.replica.apply_invitation(invitation, version);
        }
        self.emit(AccessEvent::InvitationCreated {
            invitation_id,
            folder_id,
            coach_email: coach_email.to_string(),
        });
        info!(
            %invitation_id,
            %folder_id,
            coach_email,
            coach_name,
            expiry_days = self.invitations.expiry_days,
            "coach invited"
        );
        Ok(invitation_id)
    }

    /// Accept a pending invitation as the given coach.
    ///
    /// Atomically marks the invitation accepted and adds the coach to
    /// the folder's membership with the originally requested permission:
    /// both records commit together or not at all.
    pub async fn accept_invitation(
        &self,
        invitation_id: InvitationId,
        coach_id: CoachId,
    ) -> AppResult<()> {
        retry_once_on_conflict(|| self.try_accept_invitation(invitation_id, coach_id)).await
    }

    async fn try_accept_invitation(
        &self,
        invitation_id: InvitationId,
        coach_id: CoachId,
    ) -> AppResult<()> {
        let current = self
            .remote
            .fetch_invitation(invitation_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("invitation {invitation_id}")))?;
        let invitation = current.record;

        if invitation.status != InvitationStatus::Pending {
            return Err(AppError::invitation_already_processed(format!(
                "invitation {invitation_id} is already {:?}",
                invitation.status
            )));
        }
        let now = Utc::now();
        if invitation.is_expired(now) {
            return Err(AppError::invitation_expired(format!(
                "invitation {invitation_id} expired at {}",
                invitation.expires_at
            )));
        }

        // The accepting user must be the coach the offer was addressed
        // to, not merely any holder of the invitation ID.
        let coach = self.require_user(coach_id).await?;
        if !coach.is_coach() {
            return Err(AppError::unauthorized(format!(
                "user {coach_id} is not a coach"
            )));
        }
        if !coach.email.eq_ignore_ascii_case(&invitation.coach_email) {
            return Err(AppError::unauthorized(format!(
                "invitation {invitation_id} is not addressed to {}",
                coach.email
            )));
        }

        let folder_current = self.require_folder(invitation.folder_id).await?;
        let mut folder = folder_current.record;
        folder.add_member(coach_id, invitation.requested_permission);

        let mut accepted = invitation;
        accepted.status = InvitationStatus::Accepted;

        let receipt = self
            .remote
            .commit(
                WriteBatch::new()
                    .push(WriteOp::PutInvitation {
                        invitation: accepted.clone(),
                        expected: current.version,
                    })
                    .push(WriteOp::PutFolderMembership {
                        folder: folder.clone(),
                        expected: folder_current.version.membership,
                    }),
            )
            .await?;

        let folder_id = folder.id;
        if let Some(version) = receipt.invitation_version(invitation_id) {
            self.replica.apply_invitation(accepted, version);
        }
        if let Some(version) = receipt.folder_version(folder_id) {
            self.replica.apply_folder(folder, version);
        }
        self.emit(AccessEvent::InvitationAccepted {
            invitation_id,
            folder_id,
            coach_id,
        });
        info!(%invitation_id, %folder_id, %coach_id, "invitation accepted");
        Ok(())
    }

    /// Decline a pending invitation.
    ///
    /// Idempotent: declining an invitation that has already been
    /// processed is a no-op, not a user-visible error. Declining an
    /// expired invitation fails the same way accepting one does.
    pub async fn decline_invitation(&self, invitation_id: InvitationId) -> AppResult<()> {
        retry_once_on_conflict(|| self.try_decline_invitation(invitation_id)).await
    }

    async fn try_decline_invitation(&self, invitation_id: InvitationId) -> AppResult<()> {
        let current = self
            .remote
            .fetch_invitation(invitation_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("invitation {invitation_id}")))?;
        let invitation = current.record;

        if invitation.status.is_terminal() {
            debug!(%invitation_id, status = ?invitation.status, "decline on processed invitation is a no-op");
            return Ok(());
        }
        let now = Utc::now();
        if invitation.is_expired(now) {
            return Err(AppError::invitation_expired(format!(
                "invitation {invitation_id} expired at {}",
                invitation.expires_at
            )));
        }

        let folder_id = invitation.folder_id;
        let mut declined = invitation;
        declined.status = InvitationStatus::Declined;

        let receipt = self
            .remote
            .commit(WriteBatch::new().push(WriteOp::PutInvitation {
                invitation: declined.clone(),
                expected: current.version,
            }))
            .await?;

        if let Some(version) = receipt.invitation_version(invitation_id) {
            self.replica.apply_invitation(declined, version);
        }
        self.emit(AccessEvent::InvitationDeclined {
            invitation_id,
            folder_id,
        });
        info!(%invitation_id, %folder_id, "invitation declined");
        Ok(())
    }

    /// Accept a batch of invitations with bounded concurrency, adapted
    /// to the observed connection class.
    pub async fn accept_invitations(
        &self,
        invitation_ids: &[InvitationId],
        coach_id: CoachId,
        class: ConnectionClass,
    ) -> Vec<(InvitationId, AppResult<()>)> {
        let limit = self.transfer.concurrency_for(class).max(1);
        futures::stream::iter(invitation_ids.iter().copied())
            .map(|id| async move { (id, self.accept_invitation(id, coach_id).await) })
            .buffer_unordered(limit)
            .collect()
            .await
    }

    // ── Revocation & permissions ───────────────────────────

    /// Revoke a coach's access to a folder.
    ///
    /// Removes the coach from membership and permissions and appends
    /// exactly one revocation event, in the same atomic batch.
    /// Idempotent: if the coach is already absent, returns success
    /// without a new event.
    pub async fn revoke_coach_access(
        &self,
        folder_id: FolderId,
        coach_id: CoachId,
    ) -> AppResult<()> {
        retry_once_on_conflict(|| self.try_revoke_coach_access(folder_id, coach_id)).await
    }

    async fn try_revoke_coach_access(
        &self,
        folder_id: FolderId,
        coach_id: CoachId,
    ) -> AppResult<()> {
        let current = self.require_folder(folder_id).await?;
        let mut folder = current.record;

        if !folder.is_member(coach_id) {
            debug!(%folder_id, %coach_id, "revoke on absent coach is a no-op");
            return Ok(());
        }

        let coach = self.require_user(coach_id).await?;
        let owner = self.require_user(folder.owner_athlete_id).await?;

        folder.remove_member(coach_id);
        let event = RevocationEvent::new(
            folder_id,
            folder.name.clone(),
            coach_id,
            coach.email,
            folder.owner_athlete_id,
            owner.name,
        );
        let revocation_id = event.id;

        let receipt = self
            .remote
            .commit(
                WriteBatch::new()
                    .push(WriteOp::PutFolderMembership {
                        folder: folder.clone(),
                        expected: current.version.membership,
                    })
                    .push(WriteOp::AppendRevocation {
                        event: event.clone(),
                    }),
            )
            .await?;

        if let Some(version) = receipt.folder_version(folder_id) {
            self.replica.apply_folder(folder, version);
        }
        self.replica.apply_revocation(event);
        self.emit(AccessEvent::Revoked {
            revocation_id,
            folder_id,
            coach_id,
        });
        info!(%folder_id, %coach_id, %revocation_id, "coach access revoked");
        Ok(())
    }

    /// Overwrite a member coach's permission flags.
    ///
    /// Fails with `NotAMember` if the coach is not currently a member.
    pub async fn update_permissions(
        &self,
        folder_id: FolderId,
        coach_id: CoachId,
        new_permission: Permission,
    ) -> AppResult<()> {
        retry_once_on_conflict(|| self.try_update_permissions(folder_id, coach_id, new_permission))
            .await
    }

    async fn try_update_permissions(
        &self,
        folder_id: FolderId,
        coach_id: CoachId,
        new_permission: Permission,
    ) -> AppResult<()> {
        let current = self.require_folder(folder_id).await?;
        let mut folder = current.record;

        if !folder.is_member(coach_id) {
            return Err(AppError::not_a_member(format!(
                "coach {coach_id} is not a member of folder {folder_id}"
            )));
        }
        folder.add_member(coach_id, new_permission);

        let receipt = self
            .remote
            .commit(WriteBatch::new().push(WriteOp::PutFolderMembership {
                folder: folder.clone(),
                expected: current.version.membership,
            }))
            .await?;

        if let Some(version) = receipt.folder_version(folder_id) {
            self.replica.apply_folder(folder, version);
        }
        self.emit(AccessEvent::PermissionsUpdated {
            folder_id,
            coach_id,
        });
        info!(%folder_id, %coach_id, ?new_permission, "permissions updated");
        Ok(())
    }

    // ── Reads (replica-degrading) ──────────────────────────

    /// A folder by ID; serves the replica when the remote is unreachable.
    pub async fn get_folder(&self, folder_id: FolderId) -> AppResult<Option<SharedFolder>> {
        match self.remote.fetch_folder(folder_id).await {
            Ok(Some(vf)) => {
                self.replica.apply_folder(vf.record.clone(), vf.version);
                Ok(Some(vf.record))
            }
            Ok(None) => Ok(None),
            Err(e) if e.kind == ErrorKind::NetworkUnavailable => {
                debug!(%folder_id, "remote unreachable, serving replica");
                Ok(self.replica.get_folder(folder_id))
            }
            Err(e) => Err(e),
        }
    }

    /// Folders owned by an athlete; replica-degrading.
    pub async fn list_folders_for_athlete(
        &self,
        athlete_id: AthleteId,
    ) -> AppResult<Vec<SharedFolder>> {
        match self.remote.fetch_folders_owned_by(athlete_id).await {
            Ok(folders) => Ok(self.mirror_folders(folders)),
            Err(e) if e.kind == ErrorKind::NetworkUnavailable => {
                debug!(%athlete_id, "remote unreachable, serving replica");
                Ok(self.replica.folders_owned_by(athlete_id))
            }
            Err(e) => Err(e),
        }
    }

    /// Folders shared with a coach; replica-degrading.
    pub async fn list_folders_for_coach(&self, coach_id: CoachId) -> AppResult<Vec<SharedFolder>> {
        match self.remote.fetch_folders_shared_with(coach_id).await {
            Ok(folders) => Ok(self.mirror_folders(folders)),
            Err(e) if e.kind == ErrorKind::NetworkUnavailable => {
                debug!(%coach_id, "remote unreachable, serving replica");
                Ok(self.replica.folders_shared_with(coach_id))
            }
            Err(e) => Err(e),
        }
    }

    /// Invitations addressed to an email, newest first; replica-degrading.
    pub async fn list_invitations_for_email(
        &self,
        coach_email: &str,
    ) -> AppResult<Vec<CoachInvitation>> {
        match self.remote.fetch_invitations_for_email(coach_email).await {
            Ok(invitations) => Ok(invitations
                .into_iter()
                .map(|v| {
                    self.replica.apply_invitation(v.record.clone(), v.version);
                    v.record
                })
                .collect()),
            Err(e) if e.kind == ErrorKind::NetworkUnavailable => {
                debug!(coach_email, "remote unreachable, serving replica");
                Ok(self.replica.invitations_for_email(coach_email))
            }
            Err(e) => Err(e),
        }
    }

    /// Invitations created by an athlete, newest first; replica-degrading.
    pub async fn list_invitations_for_athlete(
        &self,
        athlete_id: AthleteId,
    ) -> AppResult<Vec<CoachInvitation>> {
        match self.remote.fetch_invitations_for_athlete(athlete_id).await {
            Ok(invitations) => Ok(invitations
                .into_iter()
                .map(|v| {
                    self.replica.apply_invitation(v.record.clone(), v.version);
                    v.record
                })
                .collect()),
            Err(e) if e.kind == ErrorKind::NetworkUnavailable => {
                debug!(%athlete_id, "remote unreachable, serving replica");
                Ok(self.replica.invitations_for_athlete(athlete_id))
            }
            Err(e) => Err(e),
        }
    }

    /// Revocation events created by an athlete; replica-degrading.
    pub async fn list_revocations_for_athlete(
        &self,
        athlete_id: AthleteId,
    ) -> AppResult<Vec<RevocationEvent>> {
        match self.remote.fetch_revocations_for_athlete(athlete_id).await {
            Ok(events) => {
                for event in &events {
                    self.replica.apply_revocation(event.clone());
                }
                Ok(events)
            }
            Err(e) if e.kind == ErrorKind::NetworkUnavailable => {
                debug!(%athlete_id, "remote unreachable, serving replica");
                Ok(self.replica.revocations_for_athlete(athlete_id))
            }
            Err(e) => Err(e),
        }
    }

    fn mirror_folders(&self, folders: Vec<VersionedFolder>) -> Vec<SharedFolder> {
        folders
            .into_iter()
            .map(|vf| {
                self.replica.apply_folder(vf.record.clone(), vf.version);
                vf.record
            })
            .collect()
    }
}
