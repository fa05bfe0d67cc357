//! Outbound notification port.

use async_trait::async_trait;
use tracing::info;

use trainhub_core::result::AppResult;
use trainhub_entity::revocation::RevocationEvent;

/// Sends the external notification for a revocation event.
///
/// This is the fire-and-forget integration boundary: implementations
/// talk to an email gateway or push service. Delivery is decoupled from
/// the revocation transaction itself.
#[async_trait]
pub trait RevocationNotifier: Send + Sync {
    /// Send a revocation notice to the affected coach.
    async fn notify(&self, event: &RevocationEvent) -> AppResult<()>;
}

/// Notifier that records the send as a structured log line.
///
/// Stands in for the email integration in environments without an
/// outbound gateway.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl RevocationNotifier for TracingNotifier {
    async fn notify(&self, event: &RevocationEvent) -> AppResult<()> {
        info!(
            coach_email = %event.coach_email,
            folder_name = %event.folder_name,
            athlete_name = %event.athlete_name,
            "revocation notice dispatched"
        );
        Ok(())
    }
}
