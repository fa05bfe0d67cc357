//! In-memory ID-keyed replica tables.

use dashmap::DashMap;
use tracing::trace;

use trainhub_core::types::{AthleteId, CoachId, FolderId, InvitationId, RevocationId};
use trainhub_entity::folder::{FolderVersion, SharedFolder};
use trainhub_entity::invitation::CoachInvitation;
use trainhub_entity::revocation::RevocationEvent;

use crate::merge;

/// A locally held folder snapshot with its last-known remote versions.
#[derive(Debug, Clone)]
pub struct FolderRecord {
    /// The folder snapshot.
    pub folder: SharedFolder,
    /// Per-field-group versions the snapshot corresponds to.
    pub version: FolderVersion,
}

/// A locally held invitation snapshot with its last-known remote version.
#[derive(Debug, Clone)]
pub struct InvitationRecord {
    /// The invitation snapshot.
    pub invitation: CoachInvitation,
    /// The version the snapshot corresponds to.
    pub version: u64,
}

/// Device-resident store of access-control state.
///
/// Explicit ID-keyed tables with relationships expressed as ID sets; no
/// implicit cascades. Reads are always served locally and never block on
/// network activity. Writes come from two places only: a committed
/// remote transaction being mirrored, or a background sync pass applying
/// a fetched snapshot; both go through the per-field-group merge.
#[derive(Debug, Default)]
pub struct LocalReplica {
    folders: DashMap<FolderId, FolderRecord>,
    invitations: DashMap<InvitationId, InvitationRecord>,
    revocations: DashMap<RevocationId, RevocationEvent>,
}

impl LocalReplica {
    /// Create an empty replica.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Folders ────────────────────────────────────────────

    /// Apply a folder snapshot, merging per field group.
    pub fn apply_folder(&self, folder: SharedFolder, version: FolderVersion) {
        let incoming = FolderRecord { folder, version };
        match self.folders.get(&incoming.folder.id) {
            Some(local) => {
                let merged = merge::merge_folder(&local, incoming);
                drop(local);
                trace!(folder_id = %merged.folder.id, "merged folder snapshot");
                self.folders.insert(merged.folder.id, merged);
            }
            None => {
                self.folders.insert(incoming.folder.id, incoming);
            }
        }
    }

    /// Drop a folder from the replica (after a remote deletion).
    pub fn remove_folder(&self, folder_id: FolderId) {
        self.folders.remove(&folder_id);
    }

    /// A folder snapshot, if held.
    pub fn get_folder(&self, folder_id: FolderId) -> Option<SharedFolder> {
        self.folders.get(&folder_id).map(|r| r.folder.clone())
    }

    /// The full record (snapshot + versions), if held.
    pub fn get_folder_record(&self, folder_id: FolderId) -> Option<FolderRecord> {
        self.folders.get(&folder_id).map(|r| r.clone())
    }

    /// All folders owned by an athlete.
    pub fn folders_owned_by(&self, athlete_id: AthleteId) -> Vec<SharedFolder> {
        self.folders
            .iter()
            .filter(|r| r.folder.owner_athlete_id == athlete_id)
            .map(|r| r.folder.clone())
            .collect()
    }

    /// All folders shared with a coach.
    pub fn folders_shared_with(&self, coach_id: CoachId) -> Vec<SharedFolder> {
        self.folders
            .iter()
            .filter(|r| r.folder.is_member(coach_id))
            .map(|r| r.folder.clone())
            .collect()
    }

    // ── Invitations ────────────────────────────────────────

    /// Apply an invitation snapshot; the higher version wins.
    pub fn apply_invitation(&self, invitation: CoachInvitation, version: u64) {
        let incoming = InvitationRecord {
            invitation,
            version,
        };
        match self.invitations.get(&incoming.invitation.id) {
            Some(local) => {
                let merged = merge::merge_invitation(&local, incoming);
                drop(local);
                self.invitations.insert(merged.invitation.id, merged);
            }
            None => {
                self.invitations.insert(incoming.invitation.id, incoming);
            }
        }
    }

    /// An invitation snapshot, if held.
    pub fn get_invitation(&self, invitation_id: InvitationId) -> Option<CoachInvitation> {
        self.invitations
            .get(&invitation_id)
            .map(|r| r.invitation.clone())
    }

    /// All invitations addressed to an email, newest first.
    pub fn invitations_for_email(&self, coach_email: &str) -> Vec<CoachInvitation> {
        let mut invitations: Vec<_> = self
            .invitations
            .iter()
            .filter(|r| r.invitation.coach_email.eq_ignore_ascii_case(coach_email))
            .map(|r| r.invitation.clone())
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        invitations
    }

    /// All invitations created by an athlete, newest first.
    pub fn invitations_for_athlete(&self, athlete_id: AthleteId) -> Vec<CoachInvitation> {
        let mut invitations: Vec<_> = self
            .invitations
            .iter()
            .filter(|r| r.invitation.athlete_id == athlete_id)
            .map(|r| r.invitation.clone())
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        invitations
    }

    // ── Revocations ────────────────────────────────────────

    /// Apply a revocation event snapshot.
    ///
    /// Append-only; for an already-held event only the monotonic
    /// `email_sent` flag can advance.
    pub fn apply_revocation(&self, event: RevocationEvent) {
        match self.revocation_sent_state(&event) {
            Some(already_sent) => {
                if event.email_sent && !already_sent {
                    self.revocations.insert(event.id, event);
                }
            }
            None => {
                self.revocations.insert(event.id, event);
            }
        }
    }

    fn revocation_sent_state(&self, event: &RevocationEvent) -> Option<bool> {
        self.revocations.get(&event.id).map(|e| e.email_sent)
    }

    /// Revocation events created by an athlete, newest first.
    pub fn revocations_for_athlete(&self, athlete_id: AthleteId) -> Vec<RevocationEvent> {
        let mut events: Vec<_> = self
            .revocations
            .iter()
            .filter(|e| e.athlete_id == athlete_id)
            .map(|e| e.clone())
            .collect();
        events.sort_by(|a, b| b.revoked_at.cmp(&a.revoked_at));
        events
    }

    /// Number of folder records held (diagnostics).
    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Number of invitation records held (diagnostics).
    pub fn invitation_count(&self) -> usize {
        self.invitations.len()
    }
}
