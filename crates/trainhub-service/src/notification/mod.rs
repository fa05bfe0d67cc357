//! Revocation notification dispatch.

pub mod dispatcher;
pub mod notifier;
pub mod runner;

pub use dispatcher::{DrainStats, NotificationDispatcher};
pub use notifier::{RevocationNotifier, TracingNotifier};
pub use runner::NotificationRunner;
