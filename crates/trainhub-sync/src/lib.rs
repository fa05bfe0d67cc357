//! # trainhub-sync
//!
//! Background reconciliation between the local replica and the remote
//! authority. One sync may be in flight per (entity kind, owner) at a
//! time; concurrent requesters coalesce onto the in-flight operation and
//! observe its outcome. Failures enter a bounded exponential backoff
//! window during which retry is strictly caller-triggered.

pub mod backoff;
pub mod coordinator;
pub mod fetcher;

pub use coordinator::{EntityKind, SyncCoordinator, SyncKey, SyncOutcome};
pub use fetcher::{ReplicaFetcher, SyncFetcher};
