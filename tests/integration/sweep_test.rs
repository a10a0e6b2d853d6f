//! Integration tests for the retention sweeps.

use std::sync::Arc;

use chrono::{Duration, Utc};

use homelist_core::types::{Jti, UserId};
use homelist_entity::session::{DeviceInfo, Session};
use homelist_entity::token::{BlacklistEntry, TokenKind};
use homelist_worker::{BlacklistSweepJob, JobExecutor, SessionSweepJob};

use crate::helpers::TestApp;

async fn seed_session(app: &TestApp, age_days: i64, active: bool) -> Session {
    let now = Utc::now();
    let mut session = Session::new(
        UserId::new(),
        Jti::new(),
        Jti::new(),
        DeviceInfo::default(),
        now - Duration::days(age_days),
    );
    if !active {
        session.invalidate(now);
    }
    app.store.sessions.create(&session).await.expect("seed session");
    session
}

async fn exists(app: &TestApp, session: &Session) -> bool {
    app.store
        .sessions
        .find_by_id(session.id)
        .await
        .expect("find")
        .is_some()
}

#[tokio::test]
async fn test_sessions_outside_retention_are_deleted() {
    let app = TestApp::new();
    let old_active = seed_session(&app, 31, true).await;
    let old_inactive = seed_session(&app, 31, false).await;
    let recent_active = seed_session(&app, 29, true).await;
    let recent_inactive = seed_session(&app, 29, false).await;

    let report = app.services.cleanup.run_once().await.expect("sweep");
    assert_eq!(report.sessions_deleted, 2);

    assert!(!exists(&app, &old_active).await);
    assert!(!exists(&app, &old_inactive).await);
    assert!(exists(&app, &recent_active).await);
    assert!(exists(&app, &recent_inactive).await);

    let report = app.services.cleanup.run_once().await.expect("sweep again");
    assert_eq!(report.sessions_deleted, 0);
}

#[tokio::test]
async fn test_blacklist_sweep_keeps_live_revocations() {
    let app = TestApp::new();
    let result = app.register("alice").await;
    app.services.auth.logout(&result.access_token).await.expect("logout");

    let now = Utc::now();
    let dead = BlacklistEntry::new(
        Jti::new(),
        TokenKind::Access,
        Some(now - Duration::hours(1)),
        now - Duration::hours(2),
    );
    let forever = BlacklistEntry::new(Jti::new(), TokenKind::Refresh, None, now);
    app.store.blacklist.upsert(&dead).await.expect("seed");
    app.store.blacklist.upsert(&forever).await.expect("seed");

    let report = app.services.cleanup.run_once().await.expect("sweep");
    assert_eq!(report.blacklist_deleted, 1);

    let auth = &app.services.auth;
    assert!(!auth.is_revoked(dead.jti).await.expect("lookup"));
    assert!(auth.is_revoked(forever.jti).await.expect("lookup"));
    let access = app.claims(&result.access_token, TokenKind::Access);
    assert!(auth.is_revoked(access.jti).await.expect("lookup"));
}

#[tokio::test]
async fn test_worker_jobs_run_the_same_sweeps() {
    let app = TestApp::new();
    seed_session(&app, 45, true).await;
    let kept = seed_session(&app, 1, true).await;

    let mut executor = JobExecutor::default();
    executor.register(Arc::new(SessionSweepJob::new(app.services.cleanup.clone())));
    executor.register(Arc::new(BlacklistSweepJob::new(app.services.cleanup.clone())));

    let output = executor
        .execute(SessionSweepJob::JOB_TYPE)
        .await
        .expect("session sweep");
    assert_eq!(output["sessions_removed"].as_u64(), Some(1));
    assert!(exists(&app, &kept).await);

    let results = executor.run_all().await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|(_, r)| r.is_ok()));
}
