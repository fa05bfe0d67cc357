//! # trainhub
//!
//! Access-control core for athlete/coach shared training folders.
//!
//! This facade crate wires the workspace members together: the remote
//! authority (canonical store), the local replica, the shared-folder
//! manager, the permission validator, the sync coordinator, and the
//! revocation notification pipeline. Embedders construct a [`Hub`] and
//! call the services it exposes.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, fmt};

pub use trainhub_core::config::AppConfig;
pub use trainhub_core::error::{AppError, ErrorKind};
pub use trainhub_core::events::AccessEvent;
pub use trainhub_core::result::AppResult;
pub use trainhub_core::types::{
    AthleteId, CoachId, ConnectionClass, FolderId, InvitationId, RevocationId, UserId,
};
pub use trainhub_entity::folder::{FolderVersion, Permission, SharedFolder};
pub use trainhub_entity::invitation::{CoachInvitation, InvitationStatus};
pub use trainhub_entity::revocation::RevocationEvent;
pub use trainhub_entity::user::{User, UserRole};
pub use trainhub_remote::{
    CommitReceipt, MemoryAuthority, RemoteAuthority, Versioned, VersionedFolder, WriteBatch,
    WriteOp,
};
pub use trainhub_replica::LocalReplica;
pub use trainhub_service::notification::{DrainStats, TracingNotifier};
pub use trainhub_service::{
    FolderAction, NotificationDispatcher, NotificationRunner, PermissionValidator,
    RevocationNotifier, SharedFolderManager,
};
pub use trainhub_sync::{
    EntityKind, ReplicaFetcher, SyncCoordinator, SyncKey, SyncOutcome,
};

use trainhub_core::config::LoggingConfig;

/// Initialize tracing from the logging configuration.
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Fully wired application core.
///
/// Owns the background notification runner; dropping the hub (or calling
/// [`Hub::shutdown`]) stops it.
pub struct Hub {
    /// The canonical store.
    pub remote: Arc<dyn RemoteAuthority>,
    /// The device-resident replica.
    pub replica: Arc<LocalReplica>,
    /// Folder, invitation, and revocation operations.
    pub folders: Arc<SharedFolderManager>,
    /// Session-scoped permission verification.
    pub permissions: Arc<PermissionValidator>,
    /// Revocation email delivery.
    pub notifications: Arc<NotificationDispatcher>,
    /// Background replica reconciliation.
    pub sync: SyncCoordinator,
    shutdown: watch::Sender<bool>,
    runner: Option<JoinHandle<()>>,
}

impl Hub {
    /// Wire the core against an in-memory authority and the tracing
    /// notifier. Intended for embedding, demos, and tests.
    pub fn bootstrap(config: AppConfig) -> Self {
        let remote: Arc<dyn RemoteAuthority> = Arc::new(MemoryAuthority::new());
        Self::with_backends(config, remote, Arc::new(TracingNotifier))
    }

    /// Wire the core against caller-supplied backends.
    pub fn with_backends(
        config: AppConfig,
        remote: Arc<dyn RemoteAuthority>,
        notifier: Arc<dyn RevocationNotifier>,
    ) -> Self {
        let replica = Arc::new(LocalReplica::new());

        let folders = Arc::new(SharedFolderManager::new(
            Arc::clone(&remote),
            Arc::clone(&replica),
            config.invitations.clone(),
            config.transfer.clone(),
        ));
        let permissions = Arc::new(PermissionValidator::new(
            Arc::clone(&remote),
            &config.sessions,
        ));
        let notifications = Arc::new(NotificationDispatcher::new(
            Arc::clone(&remote),
            notifier,
            config.notifications.clone(),
        ));
        let fetcher = Arc::new(ReplicaFetcher::new(
            Arc::clone(&remote),
            Arc::clone(&replica),
        ));
        let sync = SyncCoordinator::new(fetcher, config.sync.clone());

        let (shutdown, cancel) = watch::channel(false);
        let runner = NotificationRunner::new(Arc::clone(&notifications), &config.notifications);
        let nudges = folders.subscribe();
        let runner = tokio::spawn(async move {
            runner.run(cancel, nudges).await;
        });

        Self {
            remote,
            replica,
            folders,
            permissions,
            notifications,
            sync,
            shutdown,
            runner: Some(runner),
        }
    }

    /// Signal the background runner to stop and wait for it.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.runner.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Hub {
    fn drop(&mut self) {
        // The runner also observes the sender closing, so an explicit
        // send here only speeds up an abandoned hub's teardown.
        let _ = self.shutdown.send(true);
    }
}
