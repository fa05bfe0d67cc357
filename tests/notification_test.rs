//! Integration tests for the revocation notification pipeline.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use trainhub::{
    AppError, AppResult, NotificationDispatcher, Permission, RemoteAuthority, RevocationEvent,
    RevocationNotifier,
};
use trainhub_core::config::NotificationsConfig;

use helpers::{FailingNotifier, RecordingNotifier, TestHub};

async fn revoked_member(hub: &TestHub) -> trainhub::AthleteId {
    let athlete = hub.seed_athlete("Jane Doe", "jane@example.com");
    let coach = hub.seed_coach("Sam Coach", "sam@example.com");

    let folder_id = hub
        .manager
        .create_folder("Sprint drills", athlete)
        .await
        .expect("create folder");
    let invitation_id = hub
        .manager
        .invite_coach(folder_id, "sam@example.com", "Sam", Permission::full())
        .await
        .expect("invite");
    hub.manager
        .accept_invitation(invitation_id, coach)
        .await
        .expect("accept");
    hub.manager
        .revoke_coach_access(folder_id, coach)
        .await
        .expect("revoke");
    athlete
}

#[tokio::test]
async fn test_drain_delivers_and_flips_email_sent_once() {
    let hub = TestHub::new();
    let athlete = revoked_member(&hub).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let remote: Arc<dyn RemoteAuthority> = hub.authority.clone();
    let dispatcher = NotificationDispatcher::new(
        remote,
        notifier.clone(),
        NotificationsConfig::default(),
    );

    let stats = dispatcher.drain_once().await.expect("drain");
    assert_eq!(stats.sent, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(notifier.delivery_count(), 1);
    assert_eq!(notifier.delivered()[0].coach_email, "sam@example.com");

    let events = hub
        .manager
        .list_revocations_for_athlete(athlete)
        .await
        .expect("list");
    assert!(events[0].email_sent);

    // A second pass finds nothing unsent: delivery happens exactly once.
    let stats = dispatcher.drain_once().await.expect("second drain");
    assert_eq!(stats.sent, 0);
    assert_eq!(notifier.delivery_count(), 1);
}

#[tokio::test]
async fn test_failed_deliveries_are_bounded_and_leave_event_unsent() {
    let hub = TestHub::new();
    let athlete = revoked_member(&hub).await;

    let notifier = Arc::new(FailingNotifier::default());
    let remote: Arc<dyn RemoteAuthority> = hub.authority.clone();
    let config = NotificationsConfig {
        max_attempts: 2,
        ..NotificationsConfig::default()
    };
    let dispatcher = NotificationDispatcher::new(remote, notifier.clone(), config);

    let stats = dispatcher.drain_once().await.expect("drain 1");
    assert_eq!(stats.failed, 1);
    let stats = dispatcher.drain_once().await.expect("drain 2");
    assert_eq!(stats.failed, 1);

    // Attempt bound exhausted: further passes skip the event.
    let stats = dispatcher.drain_once().await.expect("drain 3");
    assert_eq!(stats.skipped, 1);
    assert_eq!(notifier.attempts.load(Ordering::SeqCst), 2);

    let events = hub
        .manager
        .list_revocations_for_athlete(athlete)
        .await
        .expect("list");
    assert!(!events[0].email_sent, "failed delivery must not flip the flag");
}

/// Notifier that fails a fixed number of times, then succeeds.
struct FlakyNotifier {
    remaining_failures: AtomicU32,
}

#[async_trait]
impl RevocationNotifier for FlakyNotifier {
    async fn notify(&self, _event: &RevocationEvent) -> AppResult<()> {
        if self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            Err(AppError::internal("smtp gateway flapping"))
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn test_delivery_recovers_within_attempt_bound() {
    let hub = TestHub::new();
    let athlete = revoked_member(&hub).await;

    let notifier = Arc::new(FlakyNotifier {
        remaining_failures: AtomicU32::new(1),
    });
    let remote: Arc<dyn RemoteAuthority> = hub.authority.clone();
    let dispatcher = NotificationDispatcher::new(
        remote,
        notifier,
        NotificationsConfig::default(),
    );

    let stats = dispatcher.drain_once().await.expect("drain 1");
    assert_eq!(stats.failed, 1);
    let stats = dispatcher.drain_once().await.expect("drain 2");
    assert_eq!(stats.sent, 1);

    let events = hub
        .manager
        .list_revocations_for_athlete(athlete)
        .await
        .expect("list");
    assert!(events[0].email_sent);
}
