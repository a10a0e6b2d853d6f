//! Integration tests for the credential lifecycle.

use chrono::Utc;

use homelist_core::error::ErrorReason;
use homelist_core::types::Jti;
use homelist_entity::token::TokenKind;
use homelist_service::{LoginRequest, RegisterRequest};

use crate::helpers::{PASSWORD, TestApp, device, test_config};

fn registration(email: &str, username: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        username: username.to_string(),
        password: password.to_string(),
        name: "Someone".to_string(),
    }
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let app = TestApp::new();
    let auth = &app.services.auth;

    let first = auth
        .register(registration("alice@x.com", "alice", "Passw0rd"), device("ua"))
        .await
        .expect("register");
    assert_eq!(first.user.email, "alice@x.com");
    assert!(!first.access_token.is_empty());
    assert!(!first.refresh_token.is_empty());

    let cases = [
        (registration("Alice@X.com", "other", "Passw0rd"), ErrorReason::DuplicateEmail),
        (registration("b@x.com", " ALICE ", "Passw0rd"), ErrorReason::DuplicateUsername),
        (registration("b@x.com", "bee", "password"), ErrorReason::WeakPassword),
        (registration("b@x.com", "bee", "Pw0"), ErrorReason::WeakPassword),
        (registration("nope", "bee", "Passw0rd"), ErrorReason::InvalidEmail),
        (registration("", "bee", "Passw0rd"), ErrorReason::MissingField),
    ];
    for (req, reason) in cases {
        let err = auth.register(req, device("ua")).await.unwrap_err();
        assert!(err.is(reason), "expected {reason}, got {err}");
    }

    let sessions = app
        .services
        .sessions
        .list_my_sessions(&app.context(&first.access_token).await.expect("ctx"), false)
        .await
        .expect("list");
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn test_two_logins_create_two_sessions() {
    let app = TestApp::new();
    app.register("alice").await;

    let first = app.login("alice").await;
    let second = app.login("alice").await;
    assert_ne!(first.session_id, second.session_id);

    let ctx = app.context(&second.access_token).await.expect("ctx");
    assert_eq!(ctx.session_id, Some(second.session_id));
    let active = app
        .services
        .sessions
        .list_my_sessions(&ctx, true)
        .await
        .expect("list");
    assert_eq!(active.len(), 3);
    assert_eq!(active[0].id, second.session_id);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register("alice").await;
    let auth = &app.services.auth;

    let wrong_password = auth
        .login(
            LoginRequest {
                email: "alice@x.com".into(),
                password: "Wrong0ne".into(),
            },
            device("ua"),
        )
        .await
        .unwrap_err();
    let unknown_email = auth
        .login(
            LoginRequest {
                email: "ghost@x.com".into(),
                password: PASSWORD.into(),
            },
            device("ua"),
        )
        .await
        .unwrap_err();

    assert!(wrong_password.is(ErrorReason::InvalidCredentials));
    assert!(unknown_email.is(ErrorReason::InvalidCredentials));
    assert_eq!(wrong_password.message, unknown_email.message);
}

#[tokio::test]
async fn test_fresh_jti_is_not_revoked() {
    let app = TestApp::new();
    assert!(!app.services.auth.is_revoked(Jti::new()).await.expect("lookup"));

    let result = app.register("alice").await;
    let access = app.claims(&result.access_token, TokenKind::Access);
    assert!(!app.services.auth.is_revoked(access.jti).await.expect("lookup"));
}

#[tokio::test]
async fn test_refresh_revokes_previous_access_only() {
    let app = TestApp::new();
    let result = app.register("alice").await;
    let old_access = app.claims(&result.access_token, TokenKind::Access);
    let refresh = app.claims(&result.refresh_token, TokenKind::Refresh);

    let rotated = app.services.auth.refresh(&result.refresh_token).await.expect("refresh");
    assert_ne!(rotated.jti, old_access.jti);

    let auth = &app.services.auth;
    assert!(auth.is_revoked(old_access.jti).await.expect("lookup"));
    assert!(!auth.is_revoked(rotated.jti).await.expect("lookup"));
    assert!(!auth.is_revoked(refresh.jti).await.expect("lookup"));

    let err = app.context(&result.access_token).await.unwrap_err();
    assert!(err.is(ErrorReason::TokenRevoked));
    let ctx = app.context(&rotated.token).await.expect("new access works");
    assert_eq!(ctx.session_id, Some(result.session_id));

    let again = auth.refresh(&result.refresh_token).await.expect("refresh reusable");
    assert!(auth.is_revoked(rotated.jti).await.expect("lookup"));
    assert!(!auth.is_revoked(again.jti).await.expect("lookup"));

    let stored = app
        .store
        .sessions
        .find_by_id(result.session_id)
        .await
        .expect("find")
        .expect("session");
    assert!(stored.is_active);
    assert_eq!(stored.access_jti, again.jti);
    assert_eq!(stored.refresh_jti, refresh.jti);
}

#[tokio::test]
async fn test_logout_after_refresh_revokes_current_access_and_original_refresh() {
    let app = TestApp::new();
    let result = app.register("alice").await;
    let original_access = app.claims(&result.access_token, TokenKind::Access);
    let refresh = app.claims(&result.refresh_token, TokenKind::Refresh);

    let current = app.services.auth.refresh(&result.refresh_token).await.expect("refresh");
    app.services.auth.logout(&current.token).await.expect("logout");

    let auth = &app.services.auth;
    assert!(auth.is_revoked(current.jti).await.expect("lookup"));
    assert!(auth.is_revoked(refresh.jti).await.expect("lookup"));
    assert!(auth.is_revoked(original_access.jti).await.expect("lookup"));

    let err = auth.refresh(&result.refresh_token).await.unwrap_err();
    assert!(err.is(ErrorReason::TokenRevoked));
    let err = app.context(&current.token).await.unwrap_err();
    assert!(err.is(ErrorReason::TokenRevoked));
    let err = auth.logout(&current.token).await.unwrap_err();
    assert!(err.is(ErrorReason::TokenRevoked));

    let stored = app
        .store
        .sessions
        .find_by_id(result.session_id)
        .await
        .expect("find")
        .expect("session");
    assert!(!stored.is_active);
    assert!(stored.invalidated_at.is_some());
}

#[tokio::test]
async fn test_refresh_rejects_wrong_kind_and_garbage() {
    let app = TestApp::new();
    let result = app.register("alice").await;

    let err = app.services.auth.refresh(&result.access_token).await.unwrap_err();
    assert!(err.is(ErrorReason::InvalidToken));
    let err = app.services.auth.refresh("not.a.token").await.unwrap_err();
    assert!(err.is(ErrorReason::InvalidToken));
    let err = app.context(&result.refresh_token).await.unwrap_err();
    assert!(err.is(ErrorReason::InvalidToken));
}

#[tokio::test]
async fn test_refresh_without_session_is_session_not_found() {
    let app = TestApp::new();
    let result = app.register("alice").await;

    // Sweep the session away without blacklisting its refresh JTI.
    app.store
        .sessions
        .delete_created_before(Utc::now() + chrono::Duration::seconds(1))
        .await
        .expect("delete");

    let err = app.services.auth.refresh(&result.refresh_token).await.unwrap_err();
    assert!(err.is(ErrorReason::SessionNotFound));
}

#[tokio::test]
async fn test_stale_rotation_is_rejected() {
    let app = TestApp::new();
    let result = app.register("alice").await;
    let original = app.claims(&result.access_token, TokenKind::Access);

    let winner = app.services.auth.refresh(&result.refresh_token).await.expect("refresh");

    // A refresh that read the session before the winner wrote it still
    // expects the original access JTI; its compare-and-set must fail.
    let loser = app
        .store
        .sessions
        .rotate_access_jti(result.session_id, original.jti, Jti::new(), Utc::now())
        .await
        .expect("rotate");
    assert!(loser.is_none());

    let stored = app
        .store
        .sessions
        .find_by_id(result.session_id)
        .await
        .expect("find")
        .expect("session");
    assert_eq!(stored.access_jti, winner.jti);
}

#[tokio::test]
async fn test_logout_everywhere_keeps_current_session() {
    let app = TestApp::new();
    app.register("alice").await;
    let phone = app.login("alice").await;
    let laptop = app.login("alice").await;

    let ctx = app.context(&laptop.access_token).await.expect("ctx");
    let ended = app
        .services
        .auth
        .logout_everywhere(&ctx, true)
        .await
        .expect("logout everywhere");
    assert_eq!(ended, 2);

    let err = app.context(&phone.access_token).await.unwrap_err();
    assert!(err.is(ErrorReason::TokenRevoked));
    let err = app.services.auth.refresh(&phone.refresh_token).await.unwrap_err();
    assert!(err.is(ErrorReason::TokenRevoked));

    app.context(&laptop.access_token).await.expect("current session survives");
    let ctx = app.context(&laptop.access_token).await.expect("ctx");
    let ended = app
        .services
        .auth
        .logout_everywhere(&ctx, false)
        .await
        .expect("logout everywhere");
    assert_eq!(ended, 1);
    let err = app.context(&laptop.access_token).await.unwrap_err();
    assert!(err.is(ErrorReason::TokenRevoked));
}

#[tokio::test]
async fn test_revoke_own_session_from_another() {
    let app = TestApp::new();
    let first = app.register("alice").await;
    let second = app.login("alice").await;

    let ctx = app.context(&second.access_token).await.expect("ctx");
    app.services
        .sessions
        .revoke_session(&ctx, first.session_id)
        .await
        .expect("revoke");

    let err = app.context(&first.access_token).await.unwrap_err();
    assert!(err.is(ErrorReason::TokenRevoked));
    app.context(&second.access_token).await.expect("other session untouched");
}

#[tokio::test]
async fn test_me_returns_profile_without_secrets() {
    let app = TestApp::new();
    let result = app.register("alice").await;
    let ctx = app.context(&result.access_token).await.expect("ctx");

    let me = app.services.auth.me(&ctx).await.expect("me");
    assert_eq!(me.id, result.user.id);
    assert_eq!(me.username, "alice");
    assert_eq!(me.preferences["theme"], "light");
}

#[tokio::test]
async fn test_logged_out_token_stays_revoked_through_leeway_after_sweep() {
    let mut config = test_config();
    config.auth.access_ttl_seconds = 1;
    config.auth.leeway_seconds = 5;
    let app = TestApp::with_config(config);

    let result = app.register("alice").await;
    app.services.auth.logout(&result.access_token).await.expect("logout");

    // Past `exp` but inside the leeway: the token still verifies.
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    let report = app.services.cleanup.run_once().await.expect("sweep");
    assert_eq!(report.blacklist_deleted, 0);

    let err = app.context(&result.access_token).await.unwrap_err();
    assert!(err.is(ErrorReason::TokenRevoked));
}
