//! Permission verification.

pub mod validator;

pub use validator::{FolderAction, PermissionValidator, can_perform};
