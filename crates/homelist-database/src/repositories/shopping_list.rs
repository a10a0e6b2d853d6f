//! Shopping list repository, limited to the home association.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use homelist_core::result::AppResult;
use homelist_core::types::{HomeId, ShoppingListId};
use homelist_entity::shopping_list::ShoppingList;

use crate::error::map_sqlx_error;

#[async_trait]
pub trait ShoppingListRepository: Send + Sync {
    async fn create(&self, list: &ShoppingList) -> AppResult<()>;

    async fn find_by_id(&self, id: ShoppingListId) -> AppResult<Option<ShoppingList>>;

    async fn list_by_home(&self, home_id: HomeId) -> AppResult<Vec<ShoppingList>>;

    /// Clear the home association of every list in the home; returns how many changed.
    async fn detach_home(&self, home_id: HomeId, now: DateTime<Utc>) -> AppResult<u64>;
}

/// PostgreSQL-backed [`ShoppingListRepository`].
#[derive(Debug, Clone)]
pub struct PgShoppingListRepository {
    pool: PgPool,
}

impl PgShoppingListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShoppingListRepository for PgShoppingListRepository {
    async fn create(&self, list: &ShoppingList) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO shopping_lists (id, name, owner_id, home_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(list.id)
        .bind(&list.name)
        .bind(list.owner_id)
        .bind(list.home_id)
        .bind(list.created_at)
        .bind(list.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to create shopping list"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: ShoppingListId) -> AppResult<Option<ShoppingList>> {
        sqlx::query_as::<_, ShoppingList>("SELECT * FROM shopping_lists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error("Failed to find shopping list"))
    }

    async fn list_by_home(&self, home_id: HomeId) -> AppResult<Vec<ShoppingList>> {
        sqlx::query_as::<_, ShoppingList>(
            "SELECT * FROM shopping_lists WHERE home_id = $1 ORDER BY created_at DESC",
        )
        .bind(home_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to list shopping lists"))
    }

    async fn detach_home(&self, home_id: HomeId, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE shopping_lists SET home_id = NULL, updated_at = $2 WHERE home_id = $1",
        )
        .bind(home_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error("Failed to detach shopping lists"))?;
        Ok(result.rows_affected())
    }
}
