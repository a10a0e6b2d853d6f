//! Invitation repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use homelist_core::result::AppResult;
use homelist_core::types::{HomeId, InvitationId, UserId};
use homelist_entity::invitation::{HomeInvitation, InvitationStatus};

use crate::error::map_sqlx_error;

/// Invitation storage.
///
/// At most one pending `invite` per (home, email) and one pending
/// `request` per (home, sender); `create` reports a violation as
/// `Conflict/DuplicatePending`.
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, invitation: &HomeInvitation) -> AppResult<()>;

    async fn find_by_id(&self, id: InvitationId) -> AppResult<Option<HomeInvitation>>;

    async fn find_pending_invite(
        &self,
        home_id: HomeId,
        email: &str,
    ) -> AppResult<Option<HomeInvitation>>;

    async fn find_pending_request(
        &self,
        home_id: HomeId,
        from_user_id: UserId,
    ) -> AppResult<Option<HomeInvitation>>;

    /// Move a pending invitation to `next`.
    ///
    /// Returns the updated record, or `None` if it was no longer pending.
    async fn transition(
        &self,
        id: InvitationId,
        next: InvitationStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Option<HomeInvitation>>;

    /// Pending records addressed to the user by id or email, newest first.
    async fn list_pending_for_recipient(
        &self,
        user_id: UserId,
        email: &str,
    ) -> AppResult<Vec<HomeInvitation>>;

    /// Pending join requests for homes the user created, newest first.
    async fn list_pending_requests_for_creator(
        &self,
        creator_id: UserId,
    ) -> AppResult<Vec<HomeInvitation>>;

    /// Everything the user sent, newest first.
    async fn list_sent_by(&self, user_id: UserId) -> AppResult<Vec<HomeInvitation>>;

    async fn delete_by_home(&self, home_id: HomeId) -> AppResult<u64>;
}

/// PostgreSQL-backed [`InvitationRepository`].
#[derive(Debug, Clone)]
pub struct PgInvitationRepository {
    pool: PgPool,
}

impl PgInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    async fn create(&self, invitation: &HomeInvitation) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO home_invitations (id, home_id, from_user_id, to_email, to_user_id, \
             kind, status, message, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(invitation.id)
        .bind(invitation.home_id)
        .bind(invitation.from_user_id)
        .bind(&invitation.to_email)
        .bind(invitation.to_user_id)
        .bind(invitation.kind)
        .bind(invitation.status)
        .bind(&invitation.message)
        .bind(invitation.created_at)
        .bind(invitation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to create invitation"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: InvitationId) -> AppResult<Option<HomeInvitation>> {
        sqlx::query_as::<_, HomeInvitation>("SELECT * FROM home_invitations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to find invitation"))
    }

    async fn find_pending_invite(
        &self,
        home_id: HomeId,
        email: &str,
    ) -> AppResult<Option<HomeInvitation>> {
        sqlx::query_as::<_, HomeInvitation>(
            "SELECT * FROM home_invitations \
             WHERE home_id = $1 AND to_email = $2 AND kind = 'invite' AND status = 'pending'",
        )
        .bind(home_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to find pending invitation"))
    }

    async fn find_pending_request(
        &self,
        home_id: HomeId,
        from_user_id: UserId,
    ) -> AppResult<Option<HomeInvitation>> {
        sqlx::query_as::<_, HomeInvitation>(
            "SELECT * FROM home_invitations \
             WHERE home_id = $1 AND from_user_id = $2 AND kind = 'request' AND status = 'pending'",
        )
        .bind(home_id)
        .bind(from_user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to find pending join request"))
    }

    async fn transition(
        &self,
        id: InvitationId,
        next: InvitationStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Option<HomeInvitation>> {
        sqlx::query_as::<_, HomeInvitation>(
            "UPDATE home_invitations SET status = $2, updated_at = $3 \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(next)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to update invitation status"))
    }

    async fn list_pending_for_recipient(
        &self,
        user_id: UserId,
        email: &str,
    ) -> AppResult<Vec<HomeInvitation>> {
        sqlx::query_as::<_, HomeInvitation>(
            "SELECT * FROM home_invitations \
             WHERE status = 'pending' AND (to_email = $2 OR to_user_id = $1) \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to list pending invitations"))
    }

    async fn list_pending_requests_for_creator(
        &self,
        creator_id: UserId,
    ) -> AppResult<Vec<HomeInvitation>> {
        sqlx::query_as::<_, HomeInvitation>(
            "SELECT i.* FROM home_invitations i JOIN homes h ON h.id = i.home_id \
             WHERE h.creator_id = $1 AND i.kind = 'request' AND i.status = 'pending' \
             ORDER BY i.created_at DESC",
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to list pending join requests"))
    }

    async fn list_sent_by(&self, user_id: UserId) -> AppResult<Vec<HomeInvitation>> {
        sqlx::query_as::<_, HomeInvitation>(
            "SELECT * FROM home_invitations WHERE from_user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to list sent invitations"))
    }

    async fn delete_by_home(&self, home_id: HomeId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM home_invitations WHERE home_id = $1")
            .bind(home_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to delete home invitations"))?;
        Ok(result.rows_affected())
    }
}
