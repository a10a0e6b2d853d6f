//! Blacklisting of a session's credentials.

use chrono::{DateTime, Duration, Utc};

use homelist_auth::RevocationRegistry;
use homelist_core::config::AuthConfig;
use homelist_core::error::AppError;
use homelist_core::types::Jti;
use homelist_entity::session::Session;
use homelist_entity::token::TokenKind;

/// Blacklists JTIs until the credential can no longer pass verification, so
/// the blacklist sweep only drops entries for credentials that are dead anyway.
///
/// Verification accepts a credential up to `leeway` past its `exp`; every
/// entry is kept for that long too.
#[derive(Debug, Clone)]
pub struct TokenRevoker {
    registry: RevocationRegistry,
    access_ttl: Duration,
    refresh_ttl: Duration,
    leeway: Duration,
}

impl TokenRevoker {
    pub fn new(registry: RevocationRegistry, config: &AuthConfig) -> Self {
        Self {
            registry,
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
            leeway: config.leeway(),
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &RevocationRegistry {
        &self.registry
    }

    /// Blacklist an access JTI whose exact expiry is unknown.
    ///
    /// The entry outlives any access token carrying the JTI.
    pub async fn revoke_access(&self, jti: Jti) -> Result<(), AppError> {
        self.revoke_access_until(jti, Utc::now() + self.access_ttl)
            .await
    }

    /// Blacklist an access JTI whose credential expires at `expires_at`.
    pub async fn revoke_access_until(
        &self,
        jti: Jti,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.registry
            .blacklist(jti, TokenKind::Access, Some(expires_at + self.leeway))
            .await
    }

    /// Blacklist both the current access JTI and the refresh JTI of `session`.
    pub async fn revoke_session(&self, session: &Session) -> Result<(), AppError> {
        self.revoke_access(session.access_jti).await?;
        self.registry
            .blacklist(
                session.refresh_jti,
                TokenKind::Refresh,
                Some(session.created_at + self.refresh_ttl + self.leeway),
            )
            .await
    }
}
