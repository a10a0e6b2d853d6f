//! Credential kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use homelist_core::{AppError, ErrorReason};

/// The declared kind of a signed credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential authorising API calls.
    Access,
    /// Long-lived credential used only to mint access credentials.
    Refresh,
}

impl TokenKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            _ => Err(AppError::authentication(
                ErrorReason::InvalidToken,
                format!("Unknown token kind '{s}'"),
            )),
        }
    }
}
