//! Integration tests for federated (ID token) sign-in.

use homelist_auth::ProviderAssertion;
use homelist_core::error::ErrorReason;
use homelist_entity::token::TokenKind;
use homelist_entity::user::AuthProvider;

use crate::helpers::{TestApp, device, id_token, test_config};

#[tokio::test]
async fn test_first_sign_in_creates_account_from_email() {
    let app = TestApp::new();

    let result = app
        .services
        .auth
        .federated_login(
            AuthProvider::Google,
            &id_token("g-100", "Jane.Doe@Example.com", "Jane Doe"),
            device("phone"),
        )
        .await
        .expect("federated login");

    assert_eq!(result.user.email, "jane.doe@example.com");
    assert_eq!(result.user.username, "jane.doe");
    assert_eq!(result.user.name, "Jane Doe");
    assert_eq!(result.user.provider, AuthProvider::Google);
    assert_eq!(result.user.external_id.as_deref(), Some("g-100"));
    assert!(!result.user.has_password());

    let ctx = app.context(&result.access_token).await.expect("ctx");
    assert_eq!(ctx.user_id, result.user.id);
    assert_eq!(ctx.session_id, Some(result.session_id));
}

#[tokio::test]
async fn test_same_subject_returns_same_account() {
    let app = TestApp::new();
    let assertion = id_token("g-200", "sam@example.com", "Sam");

    let first = app
        .services
        .auth
        .federated_login(AuthProvider::Google, &assertion, device("phone"))
        .await
        .expect("first");
    let second = app
        .services
        .auth
        .federated_login(AuthProvider::Google, &assertion, device("laptop"))
        .await
        .expect("second");

    assert_eq!(first.user.id, second.user.id);
    assert_ne!(first.session_id, second.session_id);
    let by_email = app
        .store
        .users
        .find_by_email("sam@example.com")
        .await
        .expect("find")
        .expect("user");
    assert_eq!(by_email.id, first.user.id);
}

#[tokio::test]
async fn test_existing_local_account_is_linked() {
    let app = TestApp::new();
    let local = app.register("alice").await;

    let result = app
        .services
        .auth
        .federated_login(
            AuthProvider::Google,
            &id_token("g-300", "ALICE@x.com", "Alice"),
            device("phone"),
        )
        .await
        .expect("link");

    assert_eq!(result.user.id, local.user.id);
    assert_eq!(result.user.external_id.as_deref(), Some("g-300"));
    assert!(result.user.has_password(), "password login keeps working");
    app.login("alice").await;

    // A different subject claiming the same email is not linked again.
    let err = app
        .services
        .auth
        .federated_login(
            AuthProvider::Google,
            &id_token("g-301", "alice@x.com", "Alice"),
            device("phone"),
        )
        .await
        .unwrap_err();
    assert!(err.is(ErrorReason::EmailCollision));
}

#[tokio::test]
async fn test_collision_when_linking_disabled() {
    let mut config = test_config();
    config.oauth.link_existing_accounts = false;
    let app = TestApp::with_config(config);
    app.register("alice").await;

    let err = app
        .services
        .auth
        .federated_login(
            AuthProvider::Google,
            &id_token("g-400", "alice@x.com", "Alice"),
            device("phone"),
        )
        .await
        .unwrap_err();
    assert!(err.is(ErrorReason::EmailCollision));

    let stored = app
        .store
        .users
        .find_by_email("alice@x.com")
        .await
        .expect("find")
        .expect("user");
    assert!(stored.external_id.is_none());
}

#[tokio::test]
async fn test_invalid_assertion_is_rejected() {
    let app = TestApp::new();
    let cases = [
        id_token("", "x@example.com", "X"),
        ProviderAssertion::IdToken {
            id_token: "garbage".to_string(),
        },
        ProviderAssertion::AuthorizationCode {
            code: "abc".to_string(),
            redirect_uri: None,
        },
    ];
    for assertion in cases {
        let err = app
            .services
            .auth
            .federated_login(AuthProvider::Google, &assertion, device("phone"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorReason::InvalidAssertion), "got {err}");
    }
    let created = app
        .store
        .users
        .find_by_email("x@example.com")
        .await
        .expect("find");
    assert!(created.is_none());
}

#[tokio::test]
async fn test_handle_collision_gets_numeric_suffix() {
    let app = TestApp::new();
    app.register("jane").await;

    let result = app
        .services
        .auth
        .federated_login(
            AuthProvider::Google,
            &id_token("g-500", "jane@other.org", ""),
            device("phone"),
        )
        .await
        .expect("federated login");

    assert_eq!(result.user.username, "jane1");
    assert_eq!(result.user.name, "jane");
}

#[tokio::test]
async fn test_federated_session_refreshes_like_password_session() {
    let app = TestApp::new();
    let result = app
        .services
        .auth
        .federated_login(
            AuthProvider::Google,
            &id_token("g-600", "fed@example.com", "Fed"),
            device("phone"),
        )
        .await
        .expect("federated login");
    let old = app.claims(&result.access_token, TokenKind::Access);

    let rotated = app.services.auth.refresh(&result.refresh_token).await.expect("refresh");
    assert!(app.services.auth.is_revoked(old.jti).await.expect("lookup"));
    app.context(&rotated.token).await.expect("new token works");
}
