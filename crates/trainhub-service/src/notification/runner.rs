//! Background runner for the notification dispatcher.
//!
//! Polls on an interval and is additionally nudged by `Revoked` access
//! events, so a fresh revocation is usually delivered well before the
//! next scheduled pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time;
use tracing::{info, warn};

use trainhub_core::config::NotificationsConfig;
use trainhub_core::events::AccessEvent;

use super::dispatcher::NotificationDispatcher;

/// Poll loop driving [`NotificationDispatcher`] drain passes.
pub struct NotificationRunner {
    /// The dispatcher to drive.
    dispatcher: Arc<NotificationDispatcher>,
    /// Interval between scheduled passes.
    poll_interval: Duration,
}

impl NotificationRunner {
    /// Creates a new runner.
    pub fn new(dispatcher: Arc<NotificationDispatcher>, config: &NotificationsConfig) -> Self {
        Self {
            dispatcher,
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
        }
    }

    /// Run until the cancel signal flips to true or its sender drops.
    pub async fn run(
        &self,
        mut cancel: watch::Receiver<bool>,
        mut nudges: broadcast::Receiver<AccessEvent>,
    ) {
        info!(
            poll_interval_seconds = self.poll_interval.as_secs(),
            "notification runner started"
        );
        let mut nudges_open = true;

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("notification runner shutting down");
                        break;
                    }
                }
                _ = time::sleep(self.poll_interval) => {
                    self.drain().await;
                }
                nudge = nudges.recv(), if nudges_open => {
                    match nudge {
                        Ok(AccessEvent::Revoked { .. }) => self.drain().await,
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(_)) => self.drain().await,
                        Err(broadcast::error::RecvError::Closed) => nudges_open = false,
                    }
                }
            }
        }
    }

    async fn drain(&self) {
        if let Err(e) = self.dispatcher.drain_once().await {
            warn!(error = %e, "notification drain pass failed");
        }
    }
}
