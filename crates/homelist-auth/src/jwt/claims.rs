//! Claims carried by access and refresh credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homelist_core::types::{Jti, UserId};
use homelist_entity::token::TokenKind;

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: UserId,
    /// Credential id; the revocation key.
    pub jti: Jti,
    /// Declared credential kind.
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}
