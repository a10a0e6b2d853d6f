use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use homelist_core::result::AppResult;
use homelist_core::types::{HomeId, ShoppingListId};
use homelist_entity::shopping_list::ShoppingList;

use crate::repositories::ShoppingListRepository;

/// In-memory [`ShoppingListRepository`].
#[derive(Debug, Default)]
pub struct MemoryShoppingListRepository {
    lists: DashMap<ShoppingListId, ShoppingList>,
}

impl MemoryShoppingListRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShoppingListRepository for MemoryShoppingListRepository {
    async fn create(&self, list: &ShoppingList) -> AppResult<()> {
        self.lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ShoppingListId) -> AppResult<Option<ShoppingList>> {
        Ok(self.lists.get(&id).map(|l| l.value().clone()))
    }

    async fn list_by_home(&self, home_id: HomeId) -> AppResult<Vec<ShoppingList>> {
        let mut lists: Vec<ShoppingList> = self
            .lists
            .iter()
            .filter(|l| l.home_id == Some(home_id))
            .map(|l| l.value().clone())
            .collect();
        lists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(lists)
    }

    async fn detach_home(&self, home_id: HomeId, now: DateTime<Utc>) -> AppResult<u64> {
        let mut detached = 0;
        for mut entry in self.lists.iter_mut() {
            if entry.home_id == Some(home_id) {
                entry.value_mut().detach(now);
                detached += 1;
            }
        }
        Ok(detached)
    }
}
