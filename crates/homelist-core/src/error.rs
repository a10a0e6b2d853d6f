//! Unified application error types for HomeList.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Every user-visible failure carries
//! an [`ErrorKind`] (the category) and an [`ErrorReason`] (the stable,
//! machine-checkable cause).

use std::fmt;
use thiserror::Error;

use crate::types::response::ApiErrorResponse;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Malformed or missing input, correctable by the caller.
    Validation,
    /// Bad credentials, or an expired, invalid, or revoked token.
    Authentication,
    /// Valid identity, insufficient permission.
    Authorization,
    /// Duplicate registration, duplicate pending invitation, already a member.
    Conflict,
    /// The requested resource was not found.
    NotFound,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An external service (identity provider) failed.
    ExternalService,
}

impl ErrorKind {
    /// Returns `true` for kinds whose details must never reach the caller.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Internal
                | Self::Database
                | Self::Configuration
                | Self::Serialization
                | Self::ExternalService
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::ExternalService => write!(f, "EXTERNAL_SERVICE"),
        }
    }
}

/// Stable machine-checkable reason attached to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorReason {
    MissingField,
    InvalidInput,
    InvalidEmail,
    WeakPassword,
    DuplicateEmail,
    DuplicateUsername,
    InvalidCredentials,
    InvalidAssertion,
    EmailCollision,
    InvalidToken,
    TokenRevoked,
    SessionNotFound,
    ConcurrentRefresh,
    NotFound,
    Forbidden,
    AlreadyMember,
    NotAMember,
    DuplicatePending,
    InvalidAction,
    Internal,
}

impl ErrorReason {
    /// Returns the reason as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingField => "MISSING_FIELD",
            Self::InvalidInput => "INVALID_INPUT",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::DuplicateUsername => "DUPLICATE_USERNAME",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidAssertion => "INVALID_ASSERTION",
            Self::EmailCollision => "EMAIL_COLLISION",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::ConcurrentRefresh => "CONCURRENT_REFRESH",
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::NotAMember => "NOT_A_MEMBER",
            Self::DuplicatePending => "DUPLICATE_PENDING",
            Self::InvalidAction => "INVALID_ACTION",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified application error used throughout HomeList.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// Stable reason code, if one was attached.
    pub reason: Option<ErrorReason>,
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
            reason: None,
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
            reason: None,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Attach a stable reason code.
    pub fn with_reason(mut self, reason: ErrorReason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Returns the attached reason, or the default reason for the kind.
    pub fn reason(&self) -> ErrorReason {
        if let Some(reason) = self.reason {
            return reason;
        }
        match self.kind {
            ErrorKind::Validation => ErrorReason::InvalidInput,
            ErrorKind::Authentication => ErrorReason::InvalidToken,
            ErrorKind::Authorization => ErrorReason::Forbidden,
            ErrorKind::Conflict => ErrorReason::InvalidAction,
            ErrorKind::NotFound => ErrorReason::NotFound,
            _ => ErrorReason::Internal,
        }
    }

    /// Returns `true` if this error has the given reason.
    pub fn is(&self, reason: ErrorReason) -> bool {
        !self.kind.is_internal() && self.reason() == reason
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message).with_reason(ErrorReason::NotFound)
    }

    /// Create an authentication error.
    pub fn authentication(reason: ErrorReason, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message).with_reason(reason)
    }

    /// Create an authorization error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message).with_reason(ErrorReason::Forbidden)
    }

    /// Create a validation error.
    pub fn validation(reason: ErrorReason, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message).with_reason(reason)
    }

    /// Create a conflict error.
    pub fn conflict(reason: ErrorReason, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message).with_reason(reason)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an external service error.
    pub fn external_service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }

    /// Map this error to the body returned across the boundary.
    ///
    /// Internal kinds are logged here and replaced with a generic message.
    pub fn to_response(&self) -> ApiErrorResponse {
        if self.kind.is_internal() {
            tracing::error!(kind = %self.kind, error = %self, "Internal error at boundary");
            return ApiErrorResponse {
                error: ErrorKind::Internal.to_string(),
                reason: ErrorReason::Internal,
                message: "Internal server error".to_string(),
            };
        }

        ApiErrorResponse {
            error: self.kind.to_string(),
            reason: self.reason(),
            message: self.message.clone(),
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            reason: self.reason,
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
