//! Blacklist of credentials that verify but must be rejected.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use homelist_core::error::{AppError, ErrorReason};
use homelist_core::types::Jti;
use homelist_database::repositories::BlacklistRepository;
use homelist_entity::token::{BlacklistEntry, TokenKind};

/// The single choke point consulted before any access credential is accepted.
///
/// Lookups always go to the store; results are never cached in-process.
#[derive(Clone)]
pub struct RevocationRegistry {
    repo: Arc<dyn BlacklistRepository>,
}

impl std::fmt::Debug for RevocationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationRegistry").finish()
    }
}

impl RevocationRegistry {
    pub fn new(repo: Arc<dyn BlacklistRepository>) -> Self {
        Self { repo }
    }

    /// Record `jti` as revoked. Repeating the call is harmless.
    pub async fn blacklist(
        &self,
        jti: Jti,
        kind: TokenKind,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        let entry = BlacklistEntry::new(jti, kind, expires_at, Utc::now());
        self.repo.upsert(&entry).await?;
        debug!(jti = %jti, kind = %kind, "Token blacklisted");
        Ok(())
    }

    pub async fn is_blacklisted(&self, jti: Jti) -> Result<bool, AppError> {
        self.repo.exists(jti).await
    }

    /// Fail with `TokenRevoked` if `jti` is blacklisted.
    pub async fn ensure_not_revoked(&self, jti: Jti) -> Result<(), AppError> {
        if self.is_blacklisted(jti).await? {
            return Err(AppError::authentication(
                ErrorReason::TokenRevoked,
                "Token has been revoked",
            ));
        }
        Ok(())
    }

    /// Delete entries whose credentials have expired anyway.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let removed = self.repo.delete_expired(now).await?;
        if removed > 0 {
            info!(removed, "Swept expired blacklist entries");
        }
        Ok(removed)
    }
}
