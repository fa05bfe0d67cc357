//! Shared folder entity, per-coach permissions, and folder versioning.

pub mod model;
pub mod permission;
pub mod version;

pub use model::SharedFolder;
pub use permission::Permission;
pub use version::FolderVersion;
