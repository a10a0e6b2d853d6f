//! Shopping list reference record.
//!
//! Only the home association matters here: deleting a home detaches its
//! lists instead of deleting them. Item CRUD lives elsewhere.

use chrono::{DateTime, Utc};
use homelist_core::types::{HomeId, ShoppingListId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShoppingList {
    pub id: ShoppingListId,
    pub name: String,
    pub owner_id: UserId,
    /// `None` for a personal list.
    pub home_id: Option<HomeId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShoppingList {
    pub fn new(owner_id: UserId, name: &str, home_id: Option<HomeId>, now: DateTime<Utc>) -> Self {
        Self {
            id: ShoppingListId::new(),
            name: name.trim().to_string(),
            owner_id,
            home_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_shared(&self) -> bool {
        self.home_id.is_some()
    }

    /// Revert to a personal list.
    pub fn detach(&mut self, now: DateTime<Utc>) {
        self.home_id = None;
        self.updated_at = now;
    }
}
