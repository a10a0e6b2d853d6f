use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use homelist_core::result::AppResult;
use homelist_core::types::{HomeId, UserId};
use homelist_entity::home::{Home, HomeUpdate};

use crate::repositories::{HomeRepository, MemberUpdate};

/// In-memory [`HomeRepository`].
#[derive(Debug, Default)]
pub struct MemoryHomeRepository {
    homes: DashMap<HomeId, Home>,
}

impl MemoryHomeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn modify(&self, id: HomeId, change: impl FnOnce(&mut Home) -> bool) -> MemberUpdate {
        match self.homes.get_mut(&id) {
            Some(mut home) => {
                if change(home.value_mut()) {
                    MemberUpdate::Applied(home.value().clone())
                } else {
                    MemberUpdate::Unchanged
                }
            }
            None => MemberUpdate::HomeNotFound,
        }
    }
}

#[async_trait]
impl HomeRepository for MemoryHomeRepository {
    async fn create(&self, home: &Home) -> AppResult<()> {
        self.homes.insert(home.id, home.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: HomeId) -> AppResult<Option<Home>> {
        Ok(self.homes.get(&id).map(|h| h.value().clone()))
    }

    async fn list_for_member(&self, user_id: UserId) -> AppResult<Vec<Home>> {
        let mut homes: Vec<Home> = self
            .homes
            .iter()
            .filter(|h| h.is_member(user_id))
            .map(|h| h.value().clone())
            .collect();
        homes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(homes)
    }

    async fn update(
        &self,
        id: HomeId,
        update: &HomeUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Home>> {
        Ok(self.homes.get_mut(&id).map(|mut home| {
            home.apply(update, now);
            home.value().clone()
        }))
    }

    async fn delete(&self, id: HomeId) -> AppResult<bool> {
        Ok(self.homes.remove(&id).is_some())
    }

    async fn add_member(
        &self,
        id: HomeId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<MemberUpdate> {
        Ok(self.modify(id, |home| home.add_member(user_id, now)))
    }

    async fn remove_member(
        &self,
        id: HomeId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<MemberUpdate> {
        Ok(self.modify(id, |home| home.remove_member(user_id, now)))
    }
}
