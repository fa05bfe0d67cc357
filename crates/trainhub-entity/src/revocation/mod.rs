//! Revocation event entity.

pub mod model;

pub use model::RevocationEvent;
