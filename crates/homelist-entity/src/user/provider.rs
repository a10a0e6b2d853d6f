//! Account provider enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an account authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Email and password.
    Local,
    /// Google OpenID Connect.
    Google,
}

impl AuthProvider {
    /// Return the provider as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
