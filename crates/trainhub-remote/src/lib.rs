//! # trainhub-remote
//!
//! The Remote Authority: the canonical store for shared folders, coach
//! invitations, and revocation events. Defines the [`RemoteAuthority`]
//! port with versioned reads and an all-or-nothing compare-and-set
//! [`WriteBatch`] commit, plus an in-memory reference backend that
//! enforces the security contract server-side.

pub mod authority;
pub mod memory;
pub mod rules;

pub use authority::{
    CommitReceipt, RemoteAuthority, Versioned, VersionedFolder, WriteBatch, WriteOp,
};
pub use memory::MemoryAuthority;
