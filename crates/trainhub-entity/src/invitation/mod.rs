//! Coach invitation entity and status.

pub mod model;
pub mod status;

pub use model::CoachInvitation;
pub use status::InvitationStatus;
