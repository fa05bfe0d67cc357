//! Session-scoped permission verification against the remote authority.
//!
//! Verification never trusts a cached value: it re-fetches the canonical
//! folder record and re-derives the coach's capability from membership.
//! The result is cached only for the duration of one open interaction
//! ("session") with the folder; the next open re-verifies. A failed
//! verification purges the cached grant for that (folder, coach) pair.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use trainhub_core::config::SessionsConfig;
use trainhub_core::error::AppError;
use trainhub_core::result::AppResult;
use trainhub_core::types::{CoachId, FolderId};
use trainhub_entity::folder::Permission;
use trainhub_remote::authority::RemoteAuthority;

/// An action a coach can attempt on a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderAction {
    /// View folder contents. Implicit to membership.
    View,
    /// Upload to the folder.
    Upload,
    /// Comment on folder contents.
    Comment,
}

/// Pure capability predicate. Viewing is always allowed for a member;
/// upload and comment check the corresponding flag.
pub fn can_perform(permission: Permission, action: FolderAction) -> bool {
    match action {
        FolderAction::View => true,
        FolderAction::Upload => permission.can_upload,
        FolderAction::Comment => permission.can_comment,
    }
}

/// Re-derives coach capabilities from the remote authority.
pub struct PermissionValidator {
    /// The canonical store.
    remote: Arc<dyn RemoteAuthority>,
    /// Session-scoped grants, keyed by (folder, coach).
    grants: Cache<(FolderId, CoachId), Permission>,
}

impl PermissionValidator {
    /// Creates a new validator with a TTL-bounded grant cache.
    pub fn new(remote: Arc<dyn RemoteAuthority>, config: &SessionsConfig) -> Self {
        let grants = Cache::builder()
            .max_capacity(config.max_grants)
            .time_to_live(Duration::from_secs(config.grant_ttl_seconds))
            .build();
        Self { remote, grants }
    }

    /// Verify a coach's access to a folder against the canonical record.
    ///
    /// Always fetches from the remote authority; fails with
    /// `AccessRevoked` if the coach is not a member, purging any cached
    /// grant for the pair so stale capabilities cannot be reused.
    pub async fn verify_folder_access(
        &self,
        folder_id: FolderId,
        coach_id: CoachId,
    ) -> AppResult<Permission> {
        let folder = self
            .remote
            .fetch_folder(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("folder {folder_id}")))?
            .record;

        match folder.permission_for(coach_id) {
            Some(permission) => {
                self.grants.insert((folder_id, coach_id), permission).await;
                Ok(permission)
            }
            None => {
                self.grants.invalidate(&(folder_id, coach_id)).await;
                warn!(%folder_id, %coach_id, "access verification failed, cached grant purged");
                Err(AppError::access_revoked(format!(
                    "coach {coach_id} no longer has access to folder {folder_id}"
                )))
            }
        }
    }

    /// The grant cached by the current open interaction, if any.
    ///
    /// Serves the remainder of an open interaction after
    /// [`verify_folder_access`](Self::verify_folder_access) was called at
    /// open time; never a substitute for verification on the next open.
    pub async fn session_grant(
        &self,
        folder_id: FolderId,
        coach_id: CoachId,
    ) -> Option<Permission> {
        self.grants.get(&(folder_id, coach_id)).await
    }

    /// Drop the cached grant for a (folder, coach) pair.
    pub async fn invalidate(&self, folder_id: FolderId, coach_id: CoachId) {
        self.grants.invalidate(&(folder_id, coach_id)).await;
        debug!(%folder_id, %coach_id, "session grant invalidated");
    }

    /// Authorize an action within the current session.
    ///
    /// Uses the session grant when one is cached, verifying remotely
    /// otherwise (a fresh open). Fails with `Unauthorized` when the
    /// grant lacks the capability.
    pub async fn authorize(
        &self,
        folder_id: FolderId,
        coach_id: CoachId,
        action: FolderAction,
    ) -> AppResult<()> {
        let permission = match self.session_grant(folder_id, coach_id).await {
            Some(p) => p,
            None => self.verify_folder_access(folder_id, coach_id).await?,
        };
        if can_perform(permission, action) {
            Ok(())
        } else {
            Err(AppError::unauthorized(format!(
                "coach {coach_id} may not {action:?} on folder {folder_id}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_is_implicit_to_membership() {
        assert!(can_perform(Permission::view_only(), FolderAction::View));
        assert!(!can_perform(Permission::view_only(), FolderAction::Upload));
        assert!(!can_perform(Permission::view_only(), FolderAction::Comment));
    }

    #[test]
    fn test_flags_gate_upload_and_comment() {
        let upload_only = Permission {
            can_upload: true,
            can_comment: false,
        };
        assert!(can_perform(upload_only, FolderAction::Upload));
        assert!(!can_perform(upload_only, FolderAction::Comment));
        assert!(can_perform(Permission::full(), FolderAction::Comment));
    }
}
