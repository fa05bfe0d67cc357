//! Shared folder entity model.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trainhub_core::types::{AthleteId, CoachId, FolderId};

use super::permission::Permission;

/// An athlete's shareable resource collection.
///
/// Membership and permissions are kept as explicit ID-keyed structures.
/// Invariant: a coach is in `shared_with_coach_ids` if and only if it is a
/// key of `permissions`. Every mutator on this type re-establishes the
/// invariant; [`membership_consistent`](Self::membership_consistent)
/// checks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedFolder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Folder display name.
    pub name: String,
    /// The owning athlete.
    pub owner_athlete_id: AthleteId,
    /// Coaches currently granted access.
    pub shared_with_coach_ids: HashSet<CoachId>,
    /// Per-coach capability grants.
    pub permissions: HashMap<CoachId, Permission>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
}

impl SharedFolder {
    /// Create a new folder with empty membership.
    pub fn new(name: impl Into<String>, owner_athlete_id: AthleteId) -> Self {
        Self {
            id: FolderId::new(),
            name: name.into(),
            owner_athlete_id,
            shared_with_coach_ids: HashSet::new(),
            permissions: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether the coach is currently a member of this folder.
    pub fn is_member(&self, coach_id: CoachId) -> bool {
        self.shared_with_coach_ids.contains(&coach_id)
    }

    /// The permission granted to a member coach, if any.
    pub fn permission_for(&self, coach_id: CoachId) -> Option<Permission> {
        self.permissions.get(&coach_id).copied()
    }

    /// Add a coach to the membership set with the given permission.
    ///
    /// Updates both sides of the membership invariant together.
    pub fn add_member(&mut self, coach_id: CoachId, permission: Permission) {
        self.shared_with_coach_ids.insert(coach_id);
        self.permissions.insert(coach_id, permission);
    }

    /// Remove a coach from the membership set and permission map.
    ///
    /// Returns `true` if the coach was a member.
    pub fn remove_member(&mut self, coach_id: CoachId) -> bool {
        let was_member = self.shared_with_coach_ids.remove(&coach_id);
        self.permissions.remove(&coach_id);
        was_member
    }

    /// Check the membership ⇔ permissions invariant.
    pub fn membership_consistent(&self) -> bool {
        self.shared_with_coach_ids.len() == self.permissions.len()
            && self
                .shared_with_coach_ids
                .iter()
                .all(|c| self.permissions.contains_key(c))
    }
}
