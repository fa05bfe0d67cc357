//! # trainhub-service
//!
//! Business logic services for TrainHub: the shared-folder manager
//! (read-verify-write transactions against the remote authority), the
//! permission validator (session-scoped capability verification), and
//! the revocation notification dispatcher.

pub mod folder;
pub mod notification;
pub mod permission;

pub use folder::SharedFolderManager;
pub use notification::{NotificationDispatcher, NotificationRunner, RevocationNotifier};
pub use permission::{FolderAction, PermissionValidator};
