use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use homelist_core::result::AppResult;
use homelist_core::types::Jti;
use homelist_entity::token::BlacklistEntry;

use crate::repositories::BlacklistRepository;

/// In-memory [`BlacklistRepository`].
#[derive(Debug, Default)]
pub struct MemoryBlacklistRepository {
    entries: DashMap<Jti, BlacklistEntry>,
}

impl MemoryBlacklistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl BlacklistRepository for MemoryBlacklistRepository {
    async fn upsert(&self, entry: &BlacklistEntry) -> AppResult<()> {
        self.entries.insert(entry.jti, entry.clone());
        Ok(())
    }

    async fn exists(&self, jti: Jti) -> AppResult<bool> {
        Ok(self.entries.contains_key(&jti))
    }

    async fn find(&self, jti: Jti) -> AppResult<Option<BlacklistEntry>> {
        Ok(self.entries.get(&jti).map(|e| e.value().clone()))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before.saturating_sub(self.entries.len()) as u64)
    }
}
