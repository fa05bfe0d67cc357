//! Field-group merge for replica records.
//!
//! Last-writer-wins is applied per field group, not per record: the
//! profile group (name) and the membership group (membership set +
//! permissions) carry independent version counters, so a stale snapshot
//! of one group never overwrites a fresher value of the other.

use trainhub_entity::folder::{FolderVersion, SharedFolder};

use crate::store::{FolderRecord, InvitationRecord};

/// Merge an incoming folder snapshot into the locally held record.
///
/// Each field group is taken from whichever side carries the higher
/// version for that group; the merged record carries the per-group
/// maximum versions.
pub fn merge_folder(local: &FolderRecord, incoming: FolderRecord) -> FolderRecord {
    let (profile_source, profile_version) = if incoming.version.profile >= local.version.profile {
        (&incoming.folder, incoming.version.profile)
    } else {
        (&local.folder, local.version.profile)
    };

    let (membership_source, membership_version) =
        if incoming.version.membership >= local.version.membership {
            (&incoming.folder, incoming.version.membership)
        } else {
            (&local.folder, local.version.membership)
        };

    let folder = SharedFolder {
        id: local.folder.id,
        name: profile_source.name.clone(),
        owner_athlete_id: profile_source.owner_athlete_id,
        shared_with_coach_ids: membership_source.shared_with_coach_ids.clone(),
        permissions: membership_source.permissions.clone(),
        created_at: local.folder.created_at,
    };

    FolderRecord {
        folder,
        version: FolderVersion {
            profile: profile_version,
            membership: membership_version,
        },
    }
}

/// Merge an incoming invitation snapshot: the higher version wins whole.
pub fn merge_invitation(local: &InvitationRecord, incoming: InvitationRecord) -> InvitationRecord {
    if incoming.version >= local.version {
        incoming
    } else {
        local.clone()
    }
}
