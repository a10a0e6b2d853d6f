use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use homelist_core::result::AppResult;
use homelist_core::types::UserId;
use homelist_entity::user::{NewUser, ProfileUpdate, User};

use crate::error::unique_violation;
use crate::repositories::UserRepository;

/// In-memory [`UserRepository`] enforcing the same unique keys as the schema.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn create(&self, new_user: NewUser, now: DateTime<Utc>) -> AppResult<User> {
        let mut users = self.users.write().await;
        for existing in users.values() {
            if existing.email == new_user.email {
                return Err(unique_violation(Some("users_email_key")));
            }
            if existing.username == new_user.username {
                return Err(unique_violation(Some("users_username_key")));
            }
            if new_user.external_id.is_some() && existing.external_id == new_user.external_id {
                return Err(unique_violation(Some("users_external_id_key")));
            }
        }
        let user = new_user.into_user(now);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn link_external_id(
        &self,
        id: UserId,
        external_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.id != id && u.external_id.as_deref() == Some(external_id))
        {
            return Err(unique_violation(Some("users_external_id_key")));
        }
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        if user.external_id.is_some() {
            return Ok(None);
        }
        user.external_id = Some(external_id.to_string());
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.apply(update, now);
            user.clone()
        }))
    }
}
