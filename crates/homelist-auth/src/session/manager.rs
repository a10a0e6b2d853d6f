//! Session lifecycle manager.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use homelist_core::error::AppError;
use homelist_core::types::{Jti, SessionId, UserId};
use homelist_database::repositories::SessionRepository;
use homelist_entity::session::{DeviceInfo, Session};

/// Owns session records: creation, activity, invalidation and the
/// retention sweep.
///
/// No locks are held here; concurrent writers are ordered by the store,
/// and access-JTI rotation is a compare-and-set on the stored value.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<dyn SessionRepository>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish()
    }
}

impl SessionManager {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Persist a new active session. Every login gets its own session.
    pub async fn create_session(
        &self,
        user_id: UserId,
        access_jti: Jti,
        refresh_jti: Jti,
        device: DeviceInfo,
    ) -> Result<Session, AppError> {
        let session = Session::new(user_id, access_jti, refresh_jti, device, Utc::now());
        self.sessions.create(&session).await?;
        info!(user_id = %user_id, session_id = %session.id, "Session created");
        Ok(session)
    }

    pub async fn get(&self, session_id: SessionId) -> Result<Option<Session>, AppError> {
        self.sessions.find_by_id(session_id).await
    }

    pub async fn find_by_access_jti(&self, jti: Jti) -> Result<Option<Session>, AppError> {
        self.sessions.find_active_by_access_jti(jti).await
    }

    pub async fn find_by_refresh_jti(&self, jti: Jti) -> Result<Option<Session>, AppError> {
        self.sessions.find_active_by_refresh_jti(jti).await
    }

    /// Update last activity. Returns `false` if the session is gone.
    pub async fn touch_activity(&self, session_id: SessionId) -> Result<bool, AppError> {
        self.sessions.touch(session_id, Utc::now()).await
    }

    /// Swap the session's access JTI from `expected` to `next`.
    ///
    /// Returns `None` when another writer got there first or the session
    /// was invalidated.
    pub async fn rotate_access_jti(
        &self,
        session_id: SessionId,
        expected: Jti,
        next: Jti,
    ) -> Result<Option<Session>, AppError> {
        let rotated = self
            .sessions
            .rotate_access_jti(session_id, expected, next, Utc::now())
            .await?;
        if rotated.is_some() {
            debug!(session_id = %session_id, "Access token rotated");
        }
        Ok(rotated)
    }

    /// Mark a session inactive. Invalidating twice is harmless.
    pub async fn invalidate(&self, session_id: SessionId) -> Result<Option<Session>, AppError> {
        let session = self.sessions.invalidate(session_id, Utc::now()).await?;
        if let Some(s) = &session {
            info!(user_id = %s.user_id, session_id = %session_id, "Session invalidated");
        }
        Ok(session)
    }

    /// Deactivate every active session of a user except `except`.
    pub async fn invalidate_all_for_user(
        &self,
        user_id: UserId,
        except: Option<SessionId>,
    ) -> Result<Vec<Session>, AppError> {
        let flipped = self
            .sessions
            .invalidate_all_for_user(user_id, except, Utc::now())
            .await?;
        info!(user_id = %user_id, count = flipped.len(), "User sessions invalidated");
        Ok(flipped)
    }

    /// Sessions of a user, most recent activity first.
    pub async fn list_sessions(
        &self,
        user_id: UserId,
        active_only: bool,
    ) -> Result<Vec<Session>, AppError> {
        self.sessions.list_by_user(user_id, active_only).await
    }

    /// Hard-delete sessions created more than `retention_days` ago.
    pub async fn sweep_expired(&self, retention_days: u32) -> Result<u64, AppError> {
        let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
        let deleted = self.sessions.delete_created_before(cutoff).await?;
        if deleted > 0 {
            info!(deleted, retention_days, "Swept expired sessions");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homelist_database::memory::MemorySessionRepository;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(MemorySessionRepository::new()))
    }

    #[tokio::test]
    async fn test_two_logins_two_sessions() {
        let mgr = manager();
        let user = UserId::new();
        let a = mgr
            .create_session(user, Jti::new(), Jti::new(), DeviceInfo::default())
            .await
            .expect("create");
        let b = mgr
            .create_session(user, Jti::new(), Jti::new(), DeviceInfo::default())
            .await
            .expect("create");
        assert_ne!(a.id, b.id);
        assert_eq!(mgr.list_sessions(user, true).await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all_keeps_excluded() {
        let mgr = manager();
        let user = UserId::new();
        let keep = mgr
            .create_session(user, Jti::new(), Jti::new(), DeviceInfo::default())
            .await
            .expect("create");
        for _ in 0..2 {
            mgr.create_session(user, Jti::new(), Jti::new(), DeviceInfo::default())
                .await
                .expect("create");
        }
        let flipped = mgr
            .invalidate_all_for_user(user, Some(keep.id))
            .await
            .expect("invalidate");
        assert_eq!(flipped.len(), 2);
        let active = mgr.list_sessions(user, true).await.expect("list");
        assert_eq!(active.iter().map(|s| s.id).collect::<Vec<_>>(), vec![keep.id]);
        assert_eq!(mgr.list_sessions(user, false).await.expect("list").len(), 3);
    }

    #[tokio::test]
    async fn test_invalidate_twice_and_touch_missing() {
        let mgr = manager();
        let s = mgr
            .create_session(UserId::new(), Jti::new(), Jti::new(), DeviceInfo::default())
            .await
            .expect("create");
        let first = mgr.invalidate(s.id).await.expect("invalidate").expect("exists");
        let second = mgr.invalidate(s.id).await.expect("invalidate").expect("exists");
        assert!(!second.is_active);
        assert_eq!(first.invalidated_at, second.invalidated_at);
        assert!(mgr.find_by_access_jti(s.access_jti).await.expect("find").is_none());
        assert!(!mgr.touch_activity(SessionId::new()).await.expect("touch"));
    }
}
