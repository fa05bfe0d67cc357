//! The remote authority port.
//!
//! All reads return the record together with its version so that callers
//! can run read-verify-write transactions: re-read the record, build the
//! new state, and commit a [`WriteBatch`] whose compare-and-set
//! expectations are checked atomically against the whole batch.
//!
//! Version semantics: a created folder starts at profile/membership
//! version 1, a created invitation at version 1, and every CAS write
//! bumps the counter of exactly the group it touches. A successful
//! commit returns a [`CommitReceipt`] carrying the versions the backend
//! actually assigned, so clients mirror a committed write into their
//! local replica without a second round trip and without duplicating
//! the backend's version arithmetic.

use std::collections::HashMap;

use async_trait::async_trait;

use trainhub_core::result::AppResult;
use trainhub_core::types::{AthleteId, CoachId, FolderId, InvitationId, RevocationId, UserId};
use trainhub_entity::folder::{FolderVersion, SharedFolder};
use trainhub_entity::invitation::CoachInvitation;
use trainhub_entity::revocation::RevocationEvent;
use trainhub_entity::user::User;

/// A record paired with the version observed at read time.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    /// The record as stored.
    pub record: T,
    /// The version the record had when read.
    pub version: u64,
}

/// A folder paired with its per-field-group version counters.
#[derive(Debug, Clone)]
pub struct VersionedFolder {
    /// The folder as stored.
    pub record: SharedFolder,
    /// The profile/membership version counters at read time.
    pub version: FolderVersion,
}

/// A single write in a batch, with its compare-and-set expectation.
///
/// Folder writes are split by field group: a profile write carries and
/// applies only the profile fields, a membership write only the
/// membership fields. The authority checks and bumps only the matching
/// version counter, which is what isolates invitation-acceptance writes
/// from concurrent athlete-side folder edits.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Create a new folder. Fails if the ID already exists.
    CreateFolder {
        /// The folder to create.
        folder: SharedFolder,
    },
    /// Overwrite the profile field group (name) of an existing folder.
    PutFolderProfile {
        /// The folder carrying the new profile fields.
        folder: SharedFolder,
        /// Expected profile version.
        expected: u64,
    },
    /// Overwrite the membership field group (membership set + permissions)
    /// of an existing folder.
    PutFolderMembership {
        /// The folder carrying the new membership fields.
        folder: SharedFolder,
        /// Expected membership version.
        expected: u64,
    },
    /// Delete a folder entirely.
    DeleteFolder {
        /// The folder to delete.
        folder_id: FolderId,
        /// Expected version of both field groups.
        expected: FolderVersion,
    },
    /// Create a new invitation. Fails if the ID already exists.
    CreateInvitation {
        /// The invitation to create.
        invitation: CoachInvitation,
    },
    /// Overwrite an existing invitation.
    PutInvitation {
        /// The invitation carrying the new state.
        invitation: CoachInvitation,
        /// Expected version.
        expected: u64,
    },
    /// Append a revocation event. Fails if the ID already exists;
    /// revocation records are immutable once created.
    AppendRevocation {
        /// The event to append.
        event: RevocationEvent,
    },
}

/// An ordered set of writes committed atomically: either every op passes
/// its CAS check and security rules and all are applied, or none are.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    /// The writes to apply.
    pub ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a write to the batch.
    pub fn push(mut self, op: WriteOp) -> Self {
        self.ops.push(op);
        self
    }
}

/// Versions assigned by a successful commit, keyed by record ID.
///
/// Deleted records and append-only revocation events carry no version
/// and do not appear.
#[derive(Debug, Clone, Default)]
pub struct CommitReceipt {
    /// Post-commit folder version counters.
    pub folder_versions: HashMap<FolderId, FolderVersion>,
    /// Post-commit invitation versions.
    pub invitation_versions: HashMap<InvitationId, u64>,
}

impl CommitReceipt {
    /// The version counters assigned to a folder in this commit.
    pub fn folder_version(&self, id: FolderId) -> Option<FolderVersion> {
        self.folder_versions.get(&id).copied()
    }

    /// The version assigned to an invitation in this commit.
    pub fn invitation_version(&self, id: InvitationId) -> Option<u64> {
        self.invitation_versions.get(&id).copied()
    }
}

/// The canonical store for access-control state.
///
/// Implementations enforce the security contract independently of any
/// client: expired invitations refuse mutation, revocation records are
/// immutable except the system-owned `email_sent` flag, and comment
/// authorization is derivable server-side from the stored folder record.
#[async_trait]
pub trait RemoteAuthority: Send + Sync {
    /// Fetch a user from the directory.
    async fn fetch_user(&self, id: UserId) -> AppResult<Option<User>>;

    /// Fetch a folder with its version.
    async fn fetch_folder(&self, id: FolderId) -> AppResult<Option<VersionedFolder>>;

    /// Fetch all folders owned by an athlete.
    async fn fetch_folders_owned_by(&self, athlete_id: AthleteId)
    -> AppResult<Vec<VersionedFolder>>;

    /// Fetch all folders currently shared with a coach.
    async fn fetch_folders_shared_with(&self, coach_id: CoachId)
    -> AppResult<Vec<VersionedFolder>>;

    /// Fetch an invitation with its version.
    async fn fetch_invitation(
        &self,
        id: InvitationId,
    ) -> AppResult<Option<Versioned<CoachInvitation>>>;

    /// Find a pending, unexpired invitation for a (folder, email) pair.
    async fn find_pending_invitation(
        &self,
        folder_id: FolderId,
        coach_email: &str,
    ) -> AppResult<Option<Versioned<CoachInvitation>>>;

    /// Fetch all invitations addressed to an email, newest first.
    ///
    /// Expired pending invitations are excluded: the invitation read
    /// window closes at `expires_at` for the invited side.
    async fn fetch_invitations_for_email(
        &self,
        coach_email: &str,
    ) -> AppResult<Vec<Versioned<CoachInvitation>>>;

    /// Fetch all invitations created by an athlete, newest first.
    ///
    /// The owning athlete sees expired invitations too, for status display.
    async fn fetch_invitations_for_athlete(
        &self,
        athlete_id: AthleteId,
    ) -> AppResult<Vec<Versioned<CoachInvitation>>>;

    /// Fetch revocation events created by an athlete, newest first.
    async fn fetch_revocations_for_athlete(
        &self,
        athlete_id: AthleteId,
    ) -> AppResult<Vec<RevocationEvent>>;

    /// Fetch all revocation events with `email_sent == false`, oldest first.
    async fn fetch_unsent_revocations(&self) -> AppResult<Vec<RevocationEvent>>;

    /// Flip a revocation event's `email_sent` flag to true.
    ///
    /// Check-and-set: returns `true` if this call performed the flip,
    /// `false` if the flag was already set. This is the only permitted
    /// update to a revocation record.
    async fn mark_revocation_sent(&self, id: RevocationId) -> AppResult<bool>;

    /// Commit a write batch atomically.
    ///
    /// Fails with `Conflict` if any CAS expectation does not hold, and
    /// with the matching taxonomy error if any security rule is violated.
    /// On failure, no op in the batch is applied. On success, the receipt
    /// reports the version each written record now carries.
    async fn commit(&self, batch: WriteBatch) -> AppResult<CommitReceipt>;
}
