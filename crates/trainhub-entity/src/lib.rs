//! # trainhub-entity
//!
//! Domain entity models for TrainHub: users, shared folders and their
//! per-coach permissions, coach invitations, and revocation events.

pub mod folder;
pub mod invitation;
pub mod revocation;
pub mod user;
