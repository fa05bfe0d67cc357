//! Per-field-group folder version counters.

use serde::{Deserialize, Serialize};

/// Version counters for the two independently writable field groups of a
/// [`SharedFolder`](super::SharedFolder).
///
/// The profile group covers the athlete-edited fields (name). The
/// membership group covers `shared_with_coach_ids` and `permissions`.
/// Compare-and-set writes check only the counter of the group they touch,
/// so a coach's invitation acceptance can never conflict with, or
/// clobber, a concurrent athlete-side profile edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FolderVersion {
    /// Version of the profile field group.
    pub profile: u64,
    /// Version of the membership field group.
    pub membership: u64,
}

impl FolderVersion {
    /// Return a copy with the profile counter bumped.
    pub fn bump_profile(self) -> Self {
        Self {
            profile: self.profile + 1,
            ..self
        }
    }

    /// Return a copy with the membership counter bumped.
    pub fn bump_membership(self) -> Self {
        Self {
            membership: self.membership + 1,
            ..self
        }
    }
}
