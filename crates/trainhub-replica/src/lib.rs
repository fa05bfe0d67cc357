//! # trainhub-replica
//!
//! The Local Replica: a device-resident store of folders, invitations,
//! and revocation events. Reads never touch the network; writes arrive
//! only from committed remote transactions or background sync, and are
//! merged per field group with last-writer-wins semantics.

pub mod merge;
pub mod store;

pub use store::{FolderRecord, InvitationRecord, LocalReplica};
