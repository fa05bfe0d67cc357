//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod invitations;
pub mod logging;
pub mod notifications;
pub mod sessions;
pub mod sync;
pub mod transfer;

use serde::{Deserialize, Serialize};

pub use self::invitations::InvitationsConfig;
pub use self::logging::LoggingConfig;
pub use self::notifications::NotificationsConfig;
pub use self::sessions::SessionsConfig;
pub use self::sync::SyncConfig;
pub use self::transfer::TransferConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Background sync settings.
    pub sync: SyncConfig,
    /// Invitation policy settings.
    pub invitations: InvitationsConfig,
    /// Revocation notification settings.
    pub notifications: NotificationsConfig,
    /// Permission verification session settings.
    pub sessions: SessionsConfig,
    /// Bulk transfer concurrency settings.
    pub transfer: TransferConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `TRAINHUB_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TRAINHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
