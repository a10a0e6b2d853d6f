use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use homelist_core::result::AppResult;
use homelist_core::types::{Jti, SessionId, UserId};
use homelist_entity::session::Session;

use crate::repositories::SessionRepository;

/// In-memory [`SessionRepository`].
#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    sessions: DashMap<SessionId, Session>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_where(&self, pred: impl Fn(&Session) -> bool) -> Option<Session> {
        self.sessions
            .iter()
            .find(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn create(&self, session: &Session) -> AppResult<()> {
        self.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: SessionId) -> AppResult<Option<Session>> {
        Ok(self.sessions.get(&id).map(|s| s.value().clone()))
    }

    async fn find_active_by_access_jti(&self, jti: Jti) -> AppResult<Option<Session>> {
        Ok(self.find_where(|s| s.is_active && s.access_jti == jti))
    }

    async fn find_active_by_refresh_jti(&self, jti: Jti) -> AppResult<Option<Session>> {
        Ok(self.find_where(|s| s.is_active && s.refresh_jti == jti))
    }

    async fn touch(&self, id: SessionId, now: DateTime<Utc>) -> AppResult<bool> {
        match self.sessions.get_mut(&id) {
            Some(mut session) => {
                session.last_activity = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn rotate_access_jti(
        &self,
        id: SessionId,
        expected: Jti,
        next: Jti,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        let Some(mut session) = self.sessions.get_mut(&id) else {
            return Ok(None);
        };
        if !session.is_active || session.access_jti != expected {
            return Ok(None);
        }
        session.access_jti = next;
        session.last_activity = now;
        Ok(Some(session.value().clone()))
    }

    async fn invalidate(&self, id: SessionId, now: DateTime<Utc>) -> AppResult<Option<Session>> {
        Ok(self.sessions.get_mut(&id).map(|mut session| {
            session.invalidate(now);
            session.value().clone()
        }))
    }

    async fn invalidate_all_for_user(
        &self,
        user_id: UserId,
        except: Option<SessionId>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        let mut flipped = Vec::new();
        for mut entry in self.sessions.iter_mut() {
            let session = entry.value_mut();
            if session.user_id != user_id || Some(session.id) == except {
                continue;
            }
            if session.invalidate(now) {
                flipped.push(session.clone());
            }
        }
        Ok(flipped)
    }

    async fn list_by_user(&self, user_id: UserId, active_only: bool) -> AppResult<Vec<Session>> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|e| e.user_id == user_id && (e.is_active || !active_only))
            .map(|e| e.value().clone())
            .collect();
        sessions.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(sessions)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.created_before(cutoff));
        Ok(before.saturating_sub(self.sessions.len()) as u64)
    }
}
