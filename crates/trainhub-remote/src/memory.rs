//! In-memory remote authority backend.
//!
//! Reference implementation of [`RemoteAuthority`]: ID-keyed tables
//! behind a single lock, with the same CAS and security-rule semantics a
//! production backend must provide. Carries a connectivity toggle so
//! tests and offline simulation can exercise the degraded paths.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use trainhub_core::error::AppError;
use trainhub_core::result::AppResult;
use trainhub_core::types::{AthleteId, CoachId, FolderId, InvitationId, RevocationId, UserId};
use trainhub_entity::folder::{FolderVersion, SharedFolder};
use trainhub_entity::invitation::{CoachInvitation, InvitationStatus};
use trainhub_entity::revocation::RevocationEvent;
use trainhub_entity::user::User;

use crate::authority::{
    CommitReceipt, RemoteAuthority, Versioned, VersionedFolder, WriteBatch, WriteOp,
};
use crate::rules;

#[derive(Debug, Default)]
struct AuthorityState {
    users: HashMap<UserId, User>,
    folders: HashMap<FolderId, (SharedFolder, FolderVersion)>,
    invitations: HashMap<InvitationId, (CoachInvitation, u64)>,
    revocations: HashMap<RevocationId, RevocationEvent>,
}

/// In-memory [`RemoteAuthority`] backend.
#[derive(Debug)]
pub struct MemoryAuthority {
    state: RwLock<AuthorityState>,
    online: AtomicBool,
}

impl Default for MemoryAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthority {
    /// Create a new, empty, online authority.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(AuthorityState::default()),
            online: AtomicBool::new(true),
        }
    }

    /// Toggle simulated connectivity. While offline, every call fails
    /// with `NetworkUnavailable`.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        debug!(online, "authority connectivity changed");
    }

    /// Register or update a user in the directory.
    pub fn upsert_user(&self, user: User) {
        let mut state = self.state.write().expect("authority lock poisoned");
        state.users.insert(user.id, user);
    }

    fn ensure_online(&self) -> AppResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::network_unavailable("remote authority unreachable"))
        }
    }

    /// Check every op's CAS expectation and security rules against the
    /// current state, without applying anything.
    fn validate(state: &AuthorityState, batch: &WriteBatch) -> AppResult<()> {
        let now = Utc::now();
        for op in &batch.ops {
            match op {
                WriteOp::CreateFolder { folder } => {
                    rules::ensure_folder_well_formed(folder)?;
                    if state.folders.contains_key(&folder.id) {
                        return Err(AppError::conflict(format!(
                            "folder {} already exists",
                            folder.id
                        )));
                    }
                }
                WriteOp::PutFolderProfile { folder, expected } => {
                    let (_, version) = state
                        .folders
                        .get(&folder.id)
                        .ok_or_else(|| AppError::not_found(format!("folder {}", folder.id)))?;
                    if version.profile != *expected {
                        return Err(AppError::conflict(format!(
                            "folder {} profile changed (expected v{expected}, found v{})",
                            folder.id, version.profile
                        )));
                    }
                }
                WriteOp::PutFolderMembership { folder, expected } => {
                    rules::ensure_folder_well_formed(folder)?;
                    let (_, version) = state
                        .folders
                        .get(&folder.id)
                        .ok_or_else(|| AppError::not_found(format!("folder {}", folder.id)))?;
                    if version.membership != *expected {
                        return Err(AppError::conflict(format!(
                            "folder {} membership changed (expected v{expected}, found v{})",
                            folder.id, version.membership
                        )));
                    }
                }
                WriteOp::DeleteFolder {
                    folder_id,
                    expected,
                } => {
                    let (_, version) = state
                        .folders
                        .get(folder_id)
                        .ok_or_else(|| AppError::not_found(format!("folder {folder_id}")))?;
                    if version != expected {
                        return Err(AppError::conflict(format!(
                            "folder {folder_id} changed since read"
                        )));
                    }
                }
                WriteOp::CreateInvitation { invitation } => {
                    rules::ensure_invitation_well_formed(invitation)?;
                    if state.invitations.contains_key(&invitation.id) {
                        return Err(AppError::conflict(format!(
                            "invitation {} already exists",
                            invitation.id
                        )));
                    }
                    // Uniqueness of the pending offer is enforced here,
                    // not just by the client pre-check, so two racing
                    // invites cannot both land.
                    let duplicate = state.invitations.values().any(|(stored, _)| {
                        stored.folder_id == invitation.folder_id
                            && stored.coach_email.eq_ignore_ascii_case(&invitation.coach_email)
                            && stored.status == InvitationStatus::Pending
                            && rules::invitation_window_open(stored, now)
                    });
                    if duplicate {
                        return Err(AppError::duplicate_invitation(format!(
                            "a pending invitation for {} already exists on folder {}",
                            invitation.coach_email, invitation.folder_id
                        )));
                    }
                }
                WriteOp::PutInvitation {
                    invitation,
                    expected,
                } => {
                    let (stored, version) = state.invitations.get(&invitation.id).ok_or_else(
                        || AppError::not_found(format!("invitation {}", invitation.id)),
                    )?;
                    if version != expected {
                        return Err(AppError::conflict(format!(
                            "invitation {} changed (expected v{expected}, found v{version})",
                            invitation.id
                        )));
                    }
                    // Server-side gate: terminal or expired invitations
                    // refuse mutation no matter what the client sends.
                    rules::ensure_invitation_mutable(stored, now)?;
                }
                WriteOp::AppendRevocation { event } => {
                    if state.revocations.contains_key(&event.id) {
                        return Err(AppError::unauthorized(format!(
                            "revocation {} is immutable",
                            event.id
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn apply(state: &mut AuthorityState, batch: WriteBatch) -> CommitReceipt {
        let mut receipt = CommitReceipt::default();
        for op in batch.ops {
            match op {
                WriteOp::CreateFolder { folder } => {
                    let version = FolderVersion {
                        profile: 1,
                        membership: 1,
                    };
                    receipt.folder_versions.insert(folder.id, version);
                    state.folders.insert(folder.id, (folder, version));
                }
                WriteOp::PutFolderProfile { folder, .. } => {
                    if let Some((stored, version)) = state.folders.get_mut(&folder.id) {
                        stored.name = folder.name;
                        *version = version.bump_profile();
                        receipt.folder_versions.insert(stored.id, *version);
                    }
                }
                WriteOp::PutFolderMembership { folder, .. } => {
                    if let Some((stored, version)) = state.folders.get_mut(&folder.id) {
                        stored.shared_with_coach_ids = folder.shared_with_coach_ids;
                        stored.permissions = folder.permissions;
                        *version = version.bump_membership();
                        receipt.folder_versions.insert(stored.id, *version);
                    }
                }
                WriteOp::DeleteFolder { folder_id, .. } => {
                    state.folders.remove(&folder_id);
                }
                WriteOp::CreateInvitation { invitation } => {
                    receipt.invitation_versions.insert(invitation.id, 1);
                    state.invitations.insert(invitation.id, (invitation, 1));
                }
                WriteOp::PutInvitation { invitation, .. } => {
                    if let Some((stored, version)) = state.invitations.get_mut(&invitation.id) {
                        *stored = invitation;
                        *version += 1;
                        receipt.invitation_versions.insert(stored.id, *version);
                    }
                }
                WriteOp::AppendRevocation { event } => {
                    state.revocations.insert(event.id, event);
                }
            }
        }
        receipt
    }
}

#[async_trait]
impl RemoteAuthority for MemoryAuthority {
    async fn fetch_user(&self, id: UserId) -> AppResult<Option<User>> {
        self.ensure_online()?;
        let state = self.state.read().expect("authority lock poisoned");
        Ok(state.users.get(&id).cloned())
    }

    async fn fetch_folder(&self, id: FolderId) -> AppResult<Option<VersionedFolder>> {
        self.ensure_online()?;
        let state = self.state.read().expect("authority lock poisoned");
        Ok(state.folders.get(&id).map(|(folder, version)| {
            VersionedFolder {
                record: folder.clone(),
                version: *version,
            }
        }))
    }

    async fn fetch_folders_owned_by(
        &self,
        athlete_id: AthleteId,
    ) -> AppResult<Vec<VersionedFolder>> {
        self.ensure_online()?;
        let state = self.state.read().expect("authority lock poisoned");
        Ok(state
            .folders
            .values()
            .filter(|(folder, _)| folder.owner_athlete_id == athlete_id)
            .map(|(folder, version)| VersionedFolder {
                record: folder.clone(),
                version: *version,
            })
            .collect())
    }

    async fn fetch_folders_shared_with(
        &self,
        coach_id: CoachId,
    ) -> AppResult<Vec<VersionedFolder>> {
        self.ensure_online()?;
        let state = self.state.read().expect("authority lock poisoned");
        Ok(state
            .folders
            .values()
            .filter(|(folder, _)| folder.is_member(coach_id))
            .map(|(folder, version)| VersionedFolder {
                record: folder.clone(),
                version: *version,
            })
            .collect())
    }

    async fn fetch_invitation(
        &self,
        id: InvitationId,
    ) -> AppResult<Option<Versioned<CoachInvitation>>> {
        self.ensure_online()?;
        let state = self.state.read().expect("authority lock poisoned");
        Ok(state.invitations.get(&id).map(|(invitation, version)| {
            Versioned {
                record: invitation.clone(),
                version: *version,
            }
        }))
    }

    async fn find_pending_invitation(
        &self,
        folder_id: FolderId,
        coach_email: &str,
    ) -> AppResult<Option<Versioned<CoachInvitation>>> {
        self.ensure_online()?;
        let now = Utc::now();
        let state = self.state.read().expect("authority lock poisoned");
        Ok(state
            .invitations
            .values()
            .find(|(invitation, _)| {
                invitation.folder_id == folder_id
                    && invitation.coach_email.eq_ignore_ascii_case(coach_email)
                    && invitation.status == InvitationStatus::Pending
                    && rules::invitation_window_open(invitation, now)
            })
            .map(|(invitation, version)| Versioned {
                record: invitation.clone(),
                version: *version,
            }))
    }

    async fn fetch_invitations_for_email(
        &self,
        coach_email: &str,
    ) -> AppResult<Vec<Versioned<CoachInvitation>>> {
        self.ensure_online()?;
        let now = Utc::now();
        let state = self.state.read().expect("authority lock poisoned");
        let mut invitations: Vec<_> = state
            .invitations
            .values()
            .filter(|(invitation, _)| {
                invitation.coach_email.eq_ignore_ascii_case(coach_email)
                    // The read window for a pending offer closes at expiry.
                    && (invitation.status != InvitationStatus::Pending
                        || rules::invitation_window_open(invitation, now))
            })
            .map(|(invitation, version)| Versioned {
                record: invitation.clone(),
                version: *version,
            })
            .collect();
        invitations.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
        Ok(invitations)
    }

    async fn fetch_invitations_for_athlete(
        &self,
        athlete_id: AthleteId,
    ) -> AppResult<Vec<Versioned<CoachInvitation>>> {
        self.ensure_online()?;
        let state = self.state.read().expect("authority lock poisoned");
        let mut invitations: Vec<_> = state
            .invitations
            .values()
            .filter(|(invitation, _)| invitation.athlete_id == athlete_id)
            .map(|(invitation, version)| Versioned {
                record: invitation.clone(),
                version: *version,
            })
            .collect();
        invitations.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
        Ok(invitations)
    }

    async fn fetch_revocations_for_athlete(
        &self,
        athlete_id: AthleteId,
    ) -> AppResult<Vec<RevocationEvent>> {
        self.ensure_online()?;
        let state = self.state.read().expect("authority lock poisoned");
        let mut events: Vec<_> = state
            .revocations
            .values()
            .filter(|event| event.athlete_id == athlete_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.revoked_at.cmp(&a.revoked_at));
        Ok(events)
    }

    async fn fetch_unsent_revocations(&self) -> AppResult<Vec<RevocationEvent>> {
        self.ensure_online()?;
        let state = self.state.read().expect("authority lock poisoned");
        let mut events: Vec<_> = state
            .revocations
            .values()
            .filter(|event| !event.email_sent)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.revoked_at.cmp(&b.revoked_at));
        Ok(events)
    }

    async fn mark_revocation_sent(&self, id: RevocationId) -> AppResult<bool> {
        self.ensure_online()?;
        let mut state = self.state.write().expect("authority lock poisoned");
        let event = state
            .revocations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("revocation {id}")))?;
        if event.email_sent {
            return Ok(false);
        }
        event.email_sent = true;
        Ok(true)
    }

    async fn commit(&self, batch: WriteBatch) -> AppResult<CommitReceipt> {
        self.ensure_online()?;
        let mut state = self.state.write().expect("authority lock poisoned");
        Self::validate(&state, &batch)?;
        Ok(Self::apply(&mut state, batch))
    }
}
