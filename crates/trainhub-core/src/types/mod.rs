//! Shared type definitions used across TrainHub crates.

pub mod connection;
pub mod id;

pub use connection::ConnectionClass;
pub use id::{AthleteId, CoachId, FolderId, InvitationId, RevocationId, UserId};
