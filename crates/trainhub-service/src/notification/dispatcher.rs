//! Revocation notification dispatcher.
//!
//! Consumes revocation events with `email_sent == false`, sends the
//! notice through the [`RevocationNotifier`] port, and flips the flag
//! via check-and-set. Delivery is at-least-once: a crash between send
//! and flag flip yields a duplicate notice on the next pass, which the
//! CAS keeps to a minimum. Failures are logged and retried on later
//! passes up to a bound; persistently unsent events are an
//! operator-visible condition, not auto-resolved here.

use std::sync::Arc;

use dashmap::DashMap;
use futures::StreamExt;
use tracing::{error, info, warn};

use trainhub_core::config::NotificationsConfig;
use trainhub_core::result::AppResult;
use trainhub_core::types::RevocationId;
use trainhub_entity::revocation::RevocationEvent;
use trainhub_remote::authority::RemoteAuthority;

use super::notifier::RevocationNotifier;

/// Counts from one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    /// Events whose notice was sent and flag flipped this pass.
    pub sent: usize,
    /// Events whose delivery failed this pass.
    pub failed: usize,
    /// Events skipped because the attempt bound was exhausted.
    pub skipped: usize,
}

enum DeliveryOutcome {
    Sent,
    Failed,
    Skipped,
}

/// Drains unsent revocation events through the notifier port.
pub struct NotificationDispatcher {
    /// The canonical store.
    remote: Arc<dyn RemoteAuthority>,
    /// The outbound notification port.
    notifier: Arc<dyn RevocationNotifier>,
    /// Dispatch settings.
    config: NotificationsConfig,
    /// Failed delivery attempts per event, kept in memory.
    attempts: DashMap<RevocationId, u32>,
}

impl NotificationDispatcher {
    /// Creates a new dispatcher.
    pub fn new(
        remote: Arc<dyn RemoteAuthority>,
        notifier: Arc<dyn RevocationNotifier>,
        config: NotificationsConfig,
    ) -> Self {
        Self {
            remote,
            notifier,
            config,
            attempts: DashMap::new(),
        }
    }

    /// Run one drain pass over all unsent events, with bounded
    /// concurrency.
    pub async fn drain_once(&self) -> AppResult<DrainStats> {
        let unsent = self.remote.fetch_unsent_revocations().await?;
        if unsent.is_empty() {
            return Ok(DrainStats::default());
        }

        let concurrency = self.config.send_concurrency.max(1);
        let outcomes: Vec<DeliveryOutcome> = futures::stream::iter(unsent)
            .map(|event| self.deliver(event))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut stats = DrainStats::default();
        for outcome in outcomes {
            match outcome {
                DeliveryOutcome::Sent => stats.sent += 1,
                DeliveryOutcome::Failed => stats.failed += 1,
                DeliveryOutcome::Skipped => stats.skipped += 1,
            }
        }
        info!(
            sent = stats.sent,
            failed = stats.failed,
            skipped = stats.skipped,
            "revocation notification drain pass complete"
        );
        Ok(stats)
    }

    async fn deliver(&self, event: RevocationEvent) -> DeliveryOutcome {
        let prior_attempts = self.attempts.get(&event.id).map(|a| *a).unwrap_or(0);
        if prior_attempts >= self.config.max_attempts {
            return DeliveryOutcome::Skipped;
        }

        match self.notifier.notify(&event).await {
            Ok(()) => {
                self.attempts.remove(&event.id);
                match self.remote.mark_revocation_sent(event.id).await {
                    Ok(true) => DeliveryOutcome::Sent,
                    Ok(false) => {
                        // Another pass won the flip; the duplicate notice
                        // is tolerated.
                        DeliveryOutcome::Sent
                    }
                    Err(e) => {
                        warn!(revocation_id = %event.id, error = %e, "notice sent but flag flip failed");
                        DeliveryOutcome::Failed
                    }
                }
            }
            Err(e) => {
                let attempts = prior_attempts + 1;
                self.attempts.insert(event.id, attempts);
                if attempts >= self.config.max_attempts {
                    error!(
                        revocation_id = %event.id,
                        coach_email = %event.coach_email,
                        attempts,
                        "revocation notice undeliverable, operator attention required"
                    );
                } else {
                    warn!(
                        revocation_id = %event.id,
                        attempts,
                        error = %e,
                        "revocation notice delivery failed"
                    );
                }
                DeliveryOutcome::Failed
            }
        }
    }
}
