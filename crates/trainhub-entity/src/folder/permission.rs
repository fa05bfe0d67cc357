//! Per-coach folder permission.

use serde::{Deserialize, Serialize};

/// The capability pair granted to a coach on a folder.
///
/// Viewing is implicit to membership and is not stored independently:
/// a coach present in the folder's membership set can always view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Permission {
    /// Whether the coach may upload to the folder.
    pub can_upload: bool,
    /// Whether the coach may comment on folder contents.
    pub can_comment: bool,
}

impl Permission {
    /// A view-only grant (membership with no extra capabilities).
    pub fn view_only() -> Self {
        Self {
            can_upload: false,
            can_comment: false,
        }
    }

    /// A full grant (upload and comment).
    pub fn full() -> Self {
        Self {
            can_upload: true,
            can_comment: true,
        }
    }
}
