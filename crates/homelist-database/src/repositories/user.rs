//! User repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use homelist_core::result::AppResult;
use homelist_core::types::UserId;
use homelist_entity::user::{NewUser, ProfileUpdate, User};

use crate::error::map_sqlx_error;

/// Account storage with unique email, username and external id.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Lookup by lower-cased email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Lookup by lower-cased username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<User>>;

    /// Fetch several accounts; missing ids are skipped.
    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<User>>;

    /// Insert an account. Unique violations surface as `Conflict`.
    async fn create(&self, new_user: NewUser, now: DateTime<Utc>) -> AppResult<User>;

    /// Attach an external id to an account that has none yet.
    ///
    /// Returns `None` if the account is missing or already linked.
    async fn link_external_id(
        &self,
        id: UserId,
        external_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>>;

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>>;
}

/// PostgreSQL-backed [`UserRepository`].
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to find user"))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to find user by email"))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to find user by username"))
    }

    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to find user by external id"))
    }

    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to load users"))
    }

    async fn create(&self, new_user: NewUser, now: DateTime<Utc>) -> AppResult<User> {
        let user = new_user.into_user(now);
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, username, password_hash, provider, external_id, \
             name, photo, preferences, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10) RETURNING *",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.provider)
        .bind(&user.external_id)
        .bind(&user.name)
        .bind(&user.photo)
        .bind(Json(&user.preferences))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to create user"))
    }

    async fn link_external_id(
        &self,
        id: UserId,
        external_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET external_id = $2, updated_at = $3 \
             WHERE id = $1 AND external_id IS NULL RETURNING *",
        )
        .bind(id)
        .bind(external_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to link external identity"))
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET name = COALESCE($2, name), photo = COALESCE($3, photo), \
             preferences = CASE WHEN $4::jsonb IS NULL THEN preferences ELSE preferences || $4::jsonb END, \
             updated_at = $5 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.photo)
        .bind(update.preferences.as_ref().map(Json))
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to update profile"))
    }
}
