//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use trainhub::{
    AppConfig, AppResult, AthleteId, CoachId, CoachInvitation, InvitationId, InvitationStatus,
    LocalReplica, MemoryAuthority, Permission, PermissionValidator, RemoteAuthority,
    RevocationEvent, RevocationNotifier, SharedFolderManager, User, UserRole, WriteBatch, WriteOp,
};

/// Test application context: an online in-memory authority with the
/// services wired against it.
pub struct TestHub {
    /// The backing authority, kept concrete for connectivity toggling
    /// and user seeding.
    pub authority: Arc<MemoryAuthority>,
    /// The device-resident replica.
    pub replica: Arc<LocalReplica>,
    /// Folder, invitation, and revocation operations.
    pub manager: SharedFolderManager,
    /// Session-scoped permission verification.
    pub validator: PermissionValidator,
}

impl TestHub {
    /// Create a fresh hub with default configuration.
    pub fn new() -> Self {
        let config = AppConfig::default();
        let authority = Arc::new(MemoryAuthority::new());
        let remote: Arc<dyn RemoteAuthority> = authority.clone();
        let replica = Arc::new(LocalReplica::new());

        let manager = SharedFolderManager::new(
            Arc::clone(&remote),
            Arc::clone(&replica),
            config.invitations.clone(),
            config.transfer.clone(),
        );
        let validator = PermissionValidator::new(Arc::clone(&remote), &config.sessions);

        Self {
            authority,
            replica,
            manager,
            validator,
        }
    }

    /// Register an athlete in the directory.
    pub fn seed_athlete(&self, name: &str, email: &str) -> AthleteId {
        let id = AthleteId::new();
        self.authority.upsert_user(User {
            id: id.into(),
            email: email.to_string(),
            name: name.to_string(),
            role: UserRole::Athlete,
        });
        id
    }

    /// Register a coach in the directory.
    pub fn seed_coach(&self, name: &str, email: &str) -> CoachId {
        let id = CoachId::new();
        self.authority.upsert_user(User {
            id: id.into(),
            email: email.to_string(),
            name: name.to_string(),
            role: UserRole::Coach,
        });
        id
    }

    /// Seed a pending invitation whose window already closed, as if it
    /// had been created in the past and never acted on.
    pub async fn seed_expired_invitation(
        &self,
        folder_id: trainhub::FolderId,
        athlete_id: AthleteId,
        coach_email: &str,
        days_ago: i64,
    ) -> InvitationId {
        let created = Utc::now() - Duration::days(days_ago);
        let invitation = CoachInvitation {
            id: InvitationId::new(),
            athlete_id,
            athlete_name: "Seeded Athlete".to_string(),
            coach_email: coach_email.to_string(),
            folder_id,
            folder_name: "Seeded Folder".to_string(),
            status: InvitationStatus::Pending,
            requested_permission: Permission::view_only(),
            created_at: created,
            expires_at: created + Duration::days(7),
        };
        let id = invitation.id;
        self.authority
            .commit(WriteBatch::new().push(WriteOp::CreateInvitation { invitation }))
            .await
            .expect("seed invitation");
        id
    }
}

/// Notifier that records every delivery it makes.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: std::sync::Mutex<Vec<RevocationEvent>>,
}

impl RecordingNotifier {
    pub fn delivered(&self) -> Vec<RevocationEvent> {
        self.delivered.lock().expect("notifier lock").clone()
    }

    pub fn delivery_count(&self) -> usize {
        self.delivered.lock().expect("notifier lock").len()
    }
}

#[async_trait]
impl RevocationNotifier for RecordingNotifier {
    async fn notify(&self, event: &RevocationEvent) -> AppResult<()> {
        self.delivered
            .lock()
            .expect("notifier lock")
            .push(event.clone());
        Ok(())
    }
}

/// Notifier that fails every delivery, counting the attempts.
#[derive(Default)]
pub struct FailingNotifier {
    pub attempts: AtomicU32,
}

#[async_trait]
impl RevocationNotifier for FailingNotifier {
    async fn notify(&self, _event: &RevocationEvent) -> AppResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(trainhub::AppError::internal("smtp gateway down"))
    }
}
