//! Domain events emitted by the access-control core.

pub mod access;

pub use access::AccessEvent;
