//! Session repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use homelist_core::result::AppResult;
use homelist_core::types::{Jti, SessionId, UserId};
use homelist_entity::session::Session;

use crate::error::map_sqlx_error;

/// Session storage keyed by surrogate id.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> AppResult<()>;

    async fn find_by_id(&self, id: SessionId) -> AppResult<Option<Session>>;

    /// The active session currently bound to this access JTI.
    async fn find_active_by_access_jti(&self, jti: Jti) -> AppResult<Option<Session>>;

    /// The active session issued with this refresh JTI.
    async fn find_active_by_refresh_jti(&self, jti: Jti) -> AppResult<Option<Session>>;

    /// Set `last_activity`. Returns `false` if the session does not exist.
    async fn touch(&self, id: SessionId, now: DateTime<Utc>) -> AppResult<bool>;

    /// Replace the access JTI if, and only if, the session is active and
    /// still holds `expected`. Also touches `last_activity`.
    ///
    /// Returns the updated session, or `None` when the condition failed.
    async fn rotate_access_jti(
        &self,
        id: SessionId,
        expected: Jti,
        next: Jti,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Session>>;

    /// Mark inactive, keeping the first `invalidated_at`.
    ///
    /// Returns the session as stored afterwards, or `None` if it does not exist.
    async fn invalidate(&self, id: SessionId, now: DateTime<Utc>) -> AppResult<Option<Session>>;

    /// Deactivate every active session of a user except `except`.
    ///
    /// Returns the sessions that were flipped by this call.
    async fn invalidate_all_for_user(
        &self,
        user_id: UserId,
        except: Option<SessionId>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>>;

    /// Sessions of a user, most recent activity first.
    async fn list_by_user(&self, user_id: UserId, active_only: bool) -> AppResult<Vec<Session>>;

    /// Hard-delete sessions created before `cutoff`, active or not.
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// PostgreSQL-backed [`SessionRepository`].
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: &Session) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, access_jti, refresh_jti, user_agent, ip_address, \
             accept_language, accept_encoding, created_at, last_activity, is_active, invalidated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.access_jti)
        .bind(session.refresh_jti)
        .bind(&session.device.user_agent)
        .bind(&session.device.ip_address)
        .bind(&session.device.accept_language)
        .bind(&session.device.accept_encoding)
        .bind(session.created_at)
        .bind(session.last_activity)
        .bind(session.is_active)
        .bind(session.invalidated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to create session"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: SessionId) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to find session"))
    }

    async fn find_active_by_access_jti(&self, jti: Jti) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE access_jti = $1 AND is_active",
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to find session by access token"))
    }

    async fn find_active_by_refresh_jti(&self, jti: Jti) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE refresh_jti = $1 AND is_active",
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to find session by refresh token"))
    }

    async fn touch(&self, id: SessionId, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query("UPDATE sessions SET last_activity = $2 WHERE id = $1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to touch session"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn rotate_access_jti(
        &self,
        id: SessionId,
        expected: Jti,
        next: Jti,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            "UPDATE sessions SET access_jti = $3, last_activity = $4 \
             WHERE id = $1 AND access_jti = $2 AND is_active RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to rotate access token"))
    }

    async fn invalidate(&self, id: SessionId, now: DateTime<Utc>) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            "UPDATE sessions SET is_active = FALSE, invalidated_at = COALESCE(invalidated_at, $2) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to invalidate session"))
    }

    async fn invalidate_all_for_user(
        &self,
        user_id: UserId,
        except: Option<SessionId>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(
            "UPDATE sessions SET is_active = FALSE, invalidated_at = $3 \
             WHERE user_id = $1 AND is_active AND ($2::uuid IS NULL OR id <> $2) RETURNING *",
        )
        .bind(user_id)
        .bind(except)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to invalidate user sessions"))
    }

    async fn list_by_user(&self, user_id: UserId, active_only: bool) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE user_id = $1 AND (is_active OR NOT $2) \
             ORDER BY last_activity DESC",
        )
        .bind(user_id)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to list sessions"))
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to delete expired sessions"))?;
        Ok(result.rows_affected())
    }
}
