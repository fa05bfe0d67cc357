//! Unified application error types for TrainHub.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
///
/// The access-control taxonomy (duplicate invitations, expired or
/// already-processed invitations, revoked access, membership and
/// concurrency conflicts) is first-class here so that callers can
/// distinguish these conditions without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A pending invitation already exists for the same folder and email.
    DuplicateInvitation,
    /// The invitation's expiry time has passed.
    InvitationExpired,
    /// The invitation has already reached a terminal status.
    InvitationAlreadyProcessed,
    /// The coach's access to the folder has been revoked.
    AccessRevoked,
    /// The coach is not a member of the folder.
    NotAMember,
    /// The record changed between read and write (optimistic concurrency).
    Conflict,
    /// The remote authority is unreachable.
    NetworkUnavailable,
    /// The caller is not allowed to perform the action.
    Unauthorized,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::DuplicateInvitation => write!(f, "DUPLICATE_INVITATION"),
            Self::InvitationExpired => write!(f, "INVITATION_EXPIRED"),
            Self::InvitationAlreadyProcessed => write!(f, "INVITATION_ALREADY_PROCESSED"),
            Self::AccessRevoked => write!(f, "ACCESS_REVOKED"),
            Self::NotAMember => write!(f, "NOT_A_MEMBER"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::NetworkUnavailable => write!(f, "NETWORK_UNAVAILABLE"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout TrainHub.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a duplicate-invitation error.
    pub fn duplicate_invitation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateInvitation, message)
    }

    /// Create an invitation-expired error.
    pub fn invitation_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvitationExpired, message)
    }

    /// Create an invitation-already-processed error.
    pub fn invitation_already_processed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvitationAlreadyProcessed, message)
    }

    /// Create an access-revoked error.
    pub fn access_revoked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessRevoked, message)
    }

    /// Create a not-a-member error.
    pub fn not_a_member(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAMember, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a network-unavailable error.
    pub fn network_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkUnavailable, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error is of the given kind.
    pub fn is_kind(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
