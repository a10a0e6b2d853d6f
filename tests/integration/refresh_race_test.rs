//! Refresh racing another writer on the same session.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use homelist_core::error::{ErrorKind, ErrorReason};
use homelist_core::result::AppResult;
use homelist_core::types::{Jti, SessionId, UserId};
use homelist_database::Store;
use homelist_database::memory::MemorySessionRepository;
use homelist_database::repositories::SessionRepository;
use homelist_entity::session::Session;
use homelist_entity::token::TokenKind;

use crate::helpers::{TestApp, test_config};

/// What the competing writer does just before a rotation is attempted.
#[derive(Debug, Clone, Copy)]
enum Interference {
    Rotate,
    Invalidate,
}

/// Session store that lets another writer act between the refresh's read of
/// the session and its compare-and-set, once.
struct InterleavedSessions {
    inner: MemorySessionRepository,
    pending: Mutex<Option<Interference>>,
}

impl InterleavedSessions {
    fn new() -> Self {
        Self {
            inner: MemorySessionRepository::new(),
            pending: Mutex::new(None),
        }
    }

    fn interfere_next(&self, action: Interference) {
        *self.pending.lock().expect("lock") = Some(action);
    }
}

#[async_trait]
impl SessionRepository for InterleavedSessions {
    async fn create(&self, session: &Session) -> AppResult<()> {
        self.inner.create(session).await
    }

    async fn find_by_id(&self, id: SessionId) -> AppResult<Option<Session>> {
        self.inner.find_by_id(id).await
    }

    async fn find_active_by_access_jti(&self, jti: Jti) -> AppResult<Option<Session>> {
        self.inner.find_active_by_access_jti(jti).await
    }

    async fn find_active_by_refresh_jti(&self, jti: Jti) -> AppResult<Option<Session>> {
        self.inner.find_active_by_refresh_jti(jti).await
    }

    async fn touch(&self, id: SessionId, now: DateTime<Utc>) -> AppResult<bool> {
        self.inner.touch(id, now).await
    }

    async fn rotate_access_jti(
        &self,
        id: SessionId,
        expected: Jti,
        next: Jti,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        let action = self.pending.lock().expect("lock").take();
        match action {
            Some(Interference::Rotate) => {
                self.inner
                    .rotate_access_jti(id, expected, Jti::new(), now)
                    .await?;
            }
            Some(Interference::Invalidate) => {
                self.inner.invalidate(id, now).await?;
            }
            None => {}
        }
        self.inner.rotate_access_jti(id, expected, next, now).await
    }

    async fn invalidate(&self, id: SessionId, now: DateTime<Utc>) -> AppResult<Option<Session>> {
        self.inner.invalidate(id, now).await
    }

    async fn invalidate_all_for_user(
        &self,
        user_id: UserId,
        except: Option<SessionId>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Session>> {
        self.inner.invalidate_all_for_user(user_id, except, now).await
    }

    async fn list_by_user(&self, user_id: UserId, active_only: bool) -> AppResult<Vec<Session>> {
        self.inner.list_by_user(user_id, active_only).await
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        self.inner.delete_created_before(cutoff).await
    }
}

fn app_with(sessions: Arc<InterleavedSessions>) -> TestApp {
    let store = Store {
        sessions,
        ..Store::memory()
    };
    TestApp::with_store(store, test_config())
}

#[tokio::test]
async fn test_refresh_losing_to_concurrent_rotation_is_conflict() {
    let sessions = Arc::new(InterleavedSessions::new());
    let app = app_with(Arc::clone(&sessions));
    let result = app.register("alice").await;
    let original = app.claims(&result.access_token, TokenKind::Access);

    sessions.interfere_next(Interference::Rotate);
    let err = app.services.auth.refresh(&result.refresh_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.is(ErrorReason::ConcurrentRefresh));

    // The loser must not revoke the access JTI it expected to replace.
    assert!(!app.services.auth.is_revoked(original.jti).await.expect("lookup"));

    let stored = sessions
        .find_by_id(result.session_id)
        .await
        .expect("find")
        .expect("session");
    assert!(stored.is_active);
    assert_ne!(stored.access_jti, original.jti);

    // Without interference the next refresh goes through.
    app.services.auth.refresh(&result.refresh_token).await.expect("refresh");
}

#[tokio::test]
async fn test_refresh_racing_invalidation_is_session_not_found() {
    let sessions = Arc::new(InterleavedSessions::new());
    let app = app_with(Arc::clone(&sessions));
    let result = app.register("alice").await;

    sessions.interfere_next(Interference::Invalidate);
    let err = app.services.auth.refresh(&result.refresh_token).await.unwrap_err();
    assert!(err.is(ErrorReason::SessionNotFound));

    let stored = sessions
        .find_by_id(result.session_id)
        .await
        .expect("find")
        .expect("session");
    assert!(!stored.is_active);
}
