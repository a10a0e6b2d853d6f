//! Mapping of sqlx errors into [`AppError`].

use homelist_core::error::{AppError, ErrorKind, ErrorReason};

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Build a `map_err` adapter that keeps unique violations user-visible.
///
/// A unique violation becomes `Conflict` with the reason derived from the
/// violated constraint; everything else is an internal `Database` error.
pub fn map_sqlx_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return unique_violation(db.constraint());
            }
        }
        AppError::with_source(ErrorKind::Database, context, err)
    }
}

pub(crate) fn unique_violation(constraint: Option<&str>) -> AppError {
    match constraint {
        Some("users_email_key") => {
            AppError::conflict(ErrorReason::DuplicateEmail, "Email already registered")
        }
        Some("users_username_key") => {
            AppError::conflict(ErrorReason::DuplicateUsername, "Username already taken")
        }
        Some("users_external_id_key") => AppError::conflict(
            ErrorReason::InvalidAction,
            "External identity is already linked to another account",
        ),
        Some(name) if name.starts_with("home_invitations_pending") => AppError::conflict(
            ErrorReason::DuplicatePending,
            "A pending invitation already exists",
        ),
        other => AppError::conflict(
            ErrorReason::InvalidInput,
            format!("Duplicate record ({})", other.unwrap_or("unknown constraint")),
        ),
    }
}
