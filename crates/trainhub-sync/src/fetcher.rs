//! Fetch-and-apply port for sync passes.

use std::sync::Arc;

use async_trait::async_trait;

use trainhub_core::result::AppResult;
use trainhub_entity::user::UserRole;
use trainhub_remote::authority::RemoteAuthority;
use trainhub_replica::LocalReplica;

use crate::coordinator::{EntityKind, SyncKey};

/// Performs one sync pass for a key: fetch the remote snapshots and
/// apply them to the local replica. Returns the number of records
/// applied.
///
/// Implementations must apply local writes without interleaving awaits
/// between merge decisions; the coordinator runs the pass on a detached
/// task so caller cancellation cannot interrupt the apply.
#[async_trait]
pub trait SyncFetcher: Send + Sync {
    /// Fetch and apply the snapshots for the key.
    async fn sync(&self, key: SyncKey) -> AppResult<usize>;
}

/// Default fetcher syncing remote collections into the replica.
pub struct ReplicaFetcher {
    /// The canonical store.
    remote: Arc<dyn RemoteAuthority>,
    /// The device-resident replica.
    replica: Arc<LocalReplica>,
}

impl ReplicaFetcher {
    /// Creates a new fetcher.
    pub fn new(remote: Arc<dyn RemoteAuthority>, replica: Arc<LocalReplica>) -> Self {
        Self { remote, replica }
    }
}

#[async_trait]
impl SyncFetcher for ReplicaFetcher {
    async fn sync(&self, key: SyncKey) -> AppResult<usize> {
        let owner = key.owner;
        match key.kind {
            EntityKind::Folders => {
                let mut applied = 0;
                for vf in self.remote.fetch_folders_owned_by(owner.into()).await? {
                    self.replica.apply_folder(vf.record, vf.version);
                    applied += 1;
                }
                for vf in self.remote.fetch_folders_shared_with(owner.into()).await? {
                    self.replica.apply_folder(vf.record, vf.version);
                    applied += 1;
                }
                Ok(applied)
            }
            EntityKind::Invitations => {
                // Which side of the invitation the owner sees depends on
                // their role: athletes sync what they sent, coaches what
                // they received.
                let invitations = match self.remote.fetch_user(owner).await? {
                    Some(user) if user.role == UserRole::Coach => {
                        self.remote.fetch_invitations_for_email(&user.email).await?
                    }
                    _ => {
                        self.remote
                            .fetch_invitations_for_athlete(owner.into())
                            .await?
                    }
                };
                let applied = invitations.len();
                for v in invitations {
                    self.replica.apply_invitation(v.record, v.version);
                }
                Ok(applied)
            }
            EntityKind::Revocations => {
                let events = self
                    .remote
                    .fetch_revocations_for_athlete(owner.into())
                    .await?;
                let applied = events.len();
                for event in events {
                    self.replica.apply_revocation(event);
                }
                Ok(applied)
            }
        }
    }
}
