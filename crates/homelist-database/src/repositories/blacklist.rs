//! Revocation registry storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use homelist_core::result::AppResult;
use homelist_core::types::Jti;
use homelist_entity::token::BlacklistEntry;

use crate::error::map_sqlx_error;

/// Blacklist storage keyed by JTI.
#[async_trait]
pub trait BlacklistRepository: Send + Sync {
    /// Insert or overwrite the entry for `entry.jti`.
    async fn upsert(&self, entry: &BlacklistEntry) -> AppResult<()>;

    async fn exists(&self, jti: Jti) -> AppResult<bool>;

    async fn find(&self, jti: Jti) -> AppResult<Option<BlacklistEntry>>;

    /// Delete entries whose `expires_at` is before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// PostgreSQL-backed [`BlacklistRepository`].
#[derive(Debug, Clone)]
pub struct PgBlacklistRepository {
    pool: PgPool,
}

impl PgBlacklistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlacklistRepository for PgBlacklistRepository {
    async fn upsert(&self, entry: &BlacklistEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO token_blacklist (jti, kind, blacklisted_at, expires_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (jti) DO UPDATE SET kind = EXCLUDED.kind, \
             blacklisted_at = EXCLUDED.blacklisted_at, expires_at = EXCLUDED.expires_at",
        )
        .bind(entry.jti)
        .bind(entry.kind)
        .bind(entry.blacklisted_at)
        .bind(entry.expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to blacklist token"))?;
        Ok(())
    }

    async fn exists(&self, jti: Jti) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM token_blacklist WHERE jti = $1)",
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to check token blacklist"))
    }

    async fn find(&self, jti: Jti) -> AppResult<Option<BlacklistEntry>> {
        sqlx::query_as::<_, BlacklistEntry>("SELECT * FROM token_blacklist WHERE jti = $1")
            .bind(jti)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to load blacklist entry"))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM token_blacklist WHERE expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to sweep token blacklist"))?;
        Ok(result.rows_affected())
    }
}
