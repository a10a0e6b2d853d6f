//! Home repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use homelist_core::result::AppResult;
use homelist_core::types::{HomeId, UserId};
use homelist_entity::home::{Home, HomeUpdate};

use crate::error::map_sqlx_error;

/// Outcome of a conditional member-set change.
#[derive(Debug, Clone)]
pub enum MemberUpdate {
    /// The change was applied; carries the updated home.
    Applied(Home),
    /// The condition did not hold: already a member on add, or creator or
    /// non-member on remove.
    Unchanged,
    /// No home with that id.
    HomeNotFound,
}

/// Home storage.
#[async_trait]
pub trait HomeRepository: Send + Sync {
    async fn create(&self, home: &Home) -> AppResult<()>;

    async fn find_by_id(&self, id: HomeId) -> AppResult<Option<Home>>;

    /// Homes where the user is a member, newest first.
    async fn list_for_member(&self, user_id: UserId) -> AppResult<Vec<Home>>;

    async fn update(
        &self,
        id: HomeId,
        update: &HomeUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Home>>;

    /// Returns `false` if no home was deleted.
    async fn delete(&self, id: HomeId) -> AppResult<bool>;

    /// Append `user_id` unless already present.
    async fn add_member(
        &self,
        id: HomeId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<MemberUpdate>;

    /// Remove `user_id` if it is a member and not the creator.
    async fn remove_member(
        &self,
        id: HomeId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<MemberUpdate>;
}

/// PostgreSQL-backed [`HomeRepository`].
#[derive(Debug, Clone)]
pub struct PgHomeRepository {
    pool: PgPool,
}

impl PgHomeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: HomeId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM homes WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to check home"))
    }

    async fn outcome(&self, id: HomeId, updated: Option<Home>) -> AppResult<MemberUpdate> {
        match updated {
            Some(home) => Ok(MemberUpdate::Applied(home)),
            None if self.exists(id).await? => Ok(MemberUpdate::Unchanged),
            None => Ok(MemberUpdate::HomeNotFound),
        }
    }
}

#[async_trait]
impl HomeRepository for PgHomeRepository {
    async fn create(&self, home: &Home) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO homes (id, name, description, creator_id, members, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(home.id)
        .bind(&home.name)
        .bind(&home.description)
        .bind(home.creator_id)
        .bind(&home.members)
        .bind(home.created_at)
        .bind(home.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to create home"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: HomeId) -> AppResult<Option<Home>> {
        sqlx::query_as::<_, Home>("SELECT * FROM homes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to find home"))
    }

    async fn list_for_member(&self, user_id: UserId) -> AppResult<Vec<Home>> {
        sqlx::query_as::<_, Home>(
            "SELECT * FROM homes WHERE $1 = ANY(members) ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to list homes"))
    }

    async fn update(
        &self,
        id: HomeId,
        update: &HomeUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Home>> {
        sqlx::query_as::<_, Home>(
            "UPDATE homes SET name = COALESCE($2, name), \
             description = COALESCE($3, description), updated_at = $4 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to update home"))
    }

    async fn delete(&self, id: HomeId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM homes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to delete home"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_member(
        &self,
        id: HomeId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<MemberUpdate> {
        let updated = sqlx::query_as::<_, Home>(
            "UPDATE homes SET members = array_append(members, $2), updated_at = $3 \
             WHERE id = $1 AND NOT ($2 = ANY(members)) RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to add home member"))?;
        self.outcome(id, updated).await
    }

    async fn remove_member(
        &self,
        id: HomeId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<MemberUpdate> {
        let updated = sqlx::query_as::<_, Home>(
            "UPDATE homes SET members = array_remove(members, $2), updated_at = $3 \
             WHERE id = $1 AND creator_id <> $2 AND $2 = ANY(members) RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to remove home member"))?;
        self.outcome(id, updated).await
    }
}
