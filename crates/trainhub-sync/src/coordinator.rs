//! Per-(entity kind, owner) sync state machine with coalescing.
//!
//! States: Idle → Syncing → {Idle on success | BackoffWait on failure →
//! Idle when the window elapses}. Idle is represented by absence from
//! the state table.
//!
//! Coalescing: a request arriving while the key is Syncing subscribes to
//! the in-flight run's watch channel and receives that run's outcome, so
//! there is exactly one network round trip regardless of requester count.
//!
//! The fetch-and-apply runs on a spawned task detached from the caller,
//! so cancelling a requester (teardown of its initiating context) never
//! interrupts the replica write. The pass either completes its local
//! apply or, if it failed before applying, performs none at all.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use trainhub_core::config::SyncConfig;
use trainhub_core::error::AppError;
use trainhub_core::types::UserId;

use crate::backoff::BackoffState;
use crate::fetcher::SyncFetcher;

/// The entity collection a sync pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Shared folders (owned and shared-with).
    Folders,
    /// Coach invitations (sent or received, by owner role).
    Invitations,
    /// Revocation events.
    Revocations,
}

/// Identity of one sync state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncKey {
    /// The entity collection.
    pub kind: EntityKind,
    /// The user whose view is being synced.
    pub owner: UserId,
}

/// Result of a sync pass, as observed by every coalesced requester.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// The pass completed and applied this many records.
    Success {
        /// Number of records applied to the replica.
        applied: usize,
    },
    /// The pass failed, or the key is inside its backoff window.
    Failure {
        /// The error recorded for the pass.
        error: AppError,
    },
}

impl SyncOutcome {
    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

enum Phase {
    Syncing {
        rx: watch::Receiver<Option<SyncOutcome>>,
    },
    BackoffWait {
        until: Instant,
        last: AppError,
    },
}

enum Decision {
    Start(
        watch::Sender<Option<SyncOutcome>>,
        watch::Receiver<Option<SyncOutcome>>,
    ),
    Await(watch::Receiver<Option<SyncOutcome>>),
    Rejected(AppError),
}

struct Inner {
    fetcher: Arc<dyn SyncFetcher>,
    states: DashMap<SyncKey, Phase>,
    backoffs: DashMap<SyncKey, BackoffState>,
    config: SyncConfig,
}

/// Schedules background reconciliation per (entity kind, owner).
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

impl SyncCoordinator {
    /// Creates a new coordinator.
    pub fn new(fetcher: Arc<dyn SyncFetcher>, config: SyncConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                states: DashMap::new(),
                backoffs: DashMap::new(),
                config,
            }),
        }
    }

    /// Request a sync for the key and await its outcome.
    ///
    /// Starts a pass if the key is Idle, coalesces onto the in-flight
    /// pass if one is Syncing, and returns the recorded failure without
    /// a round trip while the key is inside its backoff window. Retry is
    /// therefore strictly caller-triggered (connectivity-restored event
    /// or periodic timer).
    pub async fn request_sync(&self, key: SyncKey) -> SyncOutcome {
        let decision = match self.inner.states.entry(key) {
            Entry::Occupied(mut occupied) => match occupied.get() {
                Phase::Syncing { rx } => Decision::Await(rx.clone()),
                Phase::BackoffWait { until, last } => {
                    if Instant::now() < *until {
                        Decision::Rejected(last.clone())
                    } else {
                        let (tx, rx) = watch::channel(None);
                        occupied.insert(Phase::Syncing { rx: rx.clone() });
                        Decision::Start(tx, rx)
                    }
                }
            },
            Entry::Vacant(vacant) => {
                let (tx, rx) = watch::channel(None);
                vacant.insert(Phase::Syncing { rx: rx.clone() });
                Decision::Start(tx, rx)
            }
        };

        match decision {
            Decision::Rejected(error) => {
                debug!(?key, "sync rejected, key in backoff window");
                SyncOutcome::Failure { error }
            }
            Decision::Await(rx) => {
                debug!(?key, "coalescing onto in-flight sync");
                Self::await_outcome(rx).await
            }
            Decision::Start(tx, rx) => {
                self.spawn_pass(key, tx);
                Self::await_outcome(rx).await
            }
        }
    }

    /// Request syncs for every entity kind of one owner, sequentially.
    pub async fn sync_owner(&self, owner: UserId) -> Vec<(EntityKind, SyncOutcome)> {
        let mut outcomes = Vec::with_capacity(3);
        for kind in [
            EntityKind::Folders,
            EntityKind::Invitations,
            EntityKind::Revocations,
        ] {
            let key = SyncKey { kind, owner };
            outcomes.push((kind, self.request_sync(key).await));
        }
        outcomes
    }

    /// Whether a pass is currently in flight for the key.
    pub fn is_syncing(&self, key: SyncKey) -> bool {
        matches!(
            self.inner.states.get(&key).as_deref(),
            Some(Phase::Syncing { .. })
        )
    }

    fn spawn_pass(&self, key: SyncKey, tx: watch::Sender<Option<SyncOutcome>>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            debug!(?key, "sync pass started");
            let outcome = match inner.fetcher.sync(key).await {
                Ok(applied) => {
                    inner.backoffs.remove(&key);
                    inner.states.remove(&key);
                    info!(?key, applied, "sync pass succeeded");
                    SyncOutcome::Success { applied }
                }
                Err(error) => {
                    let delay = inner
                        .backoffs
                        .entry(key)
                        .or_default()
                        .record_failure(&inner.config);
                    inner.states.insert(
                        key,
                        Phase::BackoffWait {
                            until: Instant::now() + delay,
                            last: error.clone(),
                        },
                    );
                    warn!(?key, delay_ms = delay.as_millis() as u64, error = %error, "sync pass failed");
                    SyncOutcome::Failure { error }
                }
            };
            let _ = tx.send(Some(outcome));
        });
    }

    async fn await_outcome(mut rx: watch::Receiver<Option<SyncOutcome>>) -> SyncOutcome {
        loop {
            let settled = rx.borrow().clone();
            if let Some(outcome) = settled {
                return outcome;
            }
            if rx.changed().await.is_err() {
                return SyncOutcome::Failure {
                    error: AppError::internal("sync pass ended without reporting an outcome"),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use trainhub_core::error::ErrorKind;
    use trainhub_core::result::AppResult;

    use super::*;

    /// Fetcher that counts calls and waits for a release signal.
    struct GatedFetcher {
        calls: AtomicU32,
        release: Notify,
        fail: bool,
    }

    impl GatedFetcher {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                release: Notify::new(),
                fail,
            })
        }
    }

    #[async_trait]
    impl SyncFetcher for GatedFetcher {
        async fn sync(&self, _key: SyncKey) -> AppResult<usize> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            if self.fail {
                Err(AppError::network_unavailable("simulated outage"))
            } else {
                Ok(3)
            }
        }
    }

    fn key() -> SyncKey {
        SyncKey {
            kind: EntityKind::Folders,
            owner: UserId::new(),
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_coalesce_to_one_pass() {
        let fetcher = GatedFetcher::new(false);
        let coordinator = SyncCoordinator::new(fetcher.clone(), SyncConfig::default());
        let key = key();

        let first = tokio::spawn({
            let c = coordinator.clone();
            async move { c.request_sync(key).await }
        });
        let second = tokio::spawn({
            let c = coordinator.clone();
            async move { c.request_sync(key).await }
        });

        // Let both requests reach the coordinator, then release the pass.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(coordinator.is_syncing(key));
        fetcher.release.notify_waiters();

        let first = first.await.expect("join");
        let second = second.await.expect("join");
        assert!(first.is_success());
        assert!(second.is_success());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(!coordinator.is_syncing(key));
    }

    #[tokio::test]
    async fn test_backoff_window_rejects_without_round_trip() {
        let fetcher = GatedFetcher::new(true);
        let config = SyncConfig {
            initial_backoff_ms: 60_000,
            max_backoff_ms: 60_000,
            backoff_multiplier: 2,
        };
        let coordinator = SyncCoordinator::new(fetcher.clone(), config);
        let key = key();

        let request = tokio::spawn({
            let c = coordinator.clone();
            async move { c.request_sync(key).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        fetcher.release.notify_waiters();

        let outcome = request.await.expect("join");
        match outcome {
            SyncOutcome::Failure { error } => {
                assert_eq!(error.kind, ErrorKind::NetworkUnavailable)
            }
            SyncOutcome::Success { .. } => panic!("expected failure"),
        }

        // Inside the window: rejected with the recorded failure, and the
        // fetcher is not called again.
        let outcome = coordinator.request_sync(key).await;
        assert!(!outcome.is_success());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_caller_cancellation_does_not_abort_the_pass() {
        let fetcher = GatedFetcher::new(false);
        let coordinator = SyncCoordinator::new(fetcher.clone(), SyncConfig::default());
        let key = key();

        // A requester that gives up almost immediately.
        let cancelled = tokio::time::timeout(
            Duration::from_millis(20),
            coordinator.request_sync(key),
        )
        .await;
        assert!(cancelled.is_err(), "requester should have timed out");

        // The pass is still in flight on its detached task.
        assert!(coordinator.is_syncing(key));

        // A later requester coalesces onto it and sees the outcome.
        fetcher.release.notify_waiters();
        let outcome = coordinator.request_sync(key).await;
        assert!(outcome.is_success());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }
}
