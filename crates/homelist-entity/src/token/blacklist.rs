//! Revocation record.

use chrono::{DateTime, Utc};
use homelist_core::types::Jti;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::TokenKind;

/// A JTI that must be rejected even though its credential still verifies.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlacklistEntry {
    /// Revoked credential id (unique key).
    pub jti: Jti,
    /// Kind of the revoked credential.
    pub kind: TokenKind,
    /// When the entry was recorded.
    pub blacklisted_at: DateTime<Utc>,
    /// After this instant the credential is expired anyway and the entry may be swept.
    pub expires_at: Option<DateTime<Utc>>,
}

impl BlacklistEntry {
    pub fn new(
        jti: Jti,
        kind: TokenKind,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            jti,
            kind,
            blacklisted_at: now,
            expires_at,
        }
    }

    /// Entries without an expiry are never swept.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp < now)
    }
}
