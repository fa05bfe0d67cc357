//! Shared folder domain operations.

pub mod manager;

pub use manager::SharedFolderManager;
