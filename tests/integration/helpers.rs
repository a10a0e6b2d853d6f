//! Shared test helpers for integration tests.

use std::sync::Arc;

use async_trait::async_trait;

use homelist_auth::{
    Claims, ExternalIdentity, IdentityProvider, JwtDecoder, ProviderAssertion,
};
use homelist_core::config::AppConfig;
use homelist_core::error::{AppError, ErrorReason};
use homelist_database::Store;
use homelist_entity::session::DeviceInfo;
use homelist_entity::token::TokenKind;
use homelist_entity::user::AuthProvider;
use homelist_service::{AuthResult, LoginRequest, RegisterRequest, RequestContext, Services};

pub const PASSWORD: &str = "Passw0rd";

/// Test application context
pub struct TestApp {
    /// Direct store access for assertions and fixtures
    pub store: Store,
    /// The services under test
    pub services: Services,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application over a fresh in-memory store
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::with_store(Store::memory(), config)
    }

    /// Build over a caller-assembled store, e.g. with a wrapped repository
    pub fn with_store(store: Store, config: AppConfig) -> Self {
        let providers: Vec<Arc<dyn IdentityProvider>> = vec![Arc::new(FakeIdentityProvider)];
        let services =
            Services::build(&store, &config, providers).expect("Failed to build services");
        Self {
            store,
            services,
            config,
        }
    }

    /// Register `handle@x.com` / `handle` with the shared test password
    pub async fn register(&self, handle: &str) -> AuthResult {
        self.services
            .auth
            .register(
                RegisterRequest {
                    email: format!("{handle}@x.com"),
                    username: handle.to_string(),
                    password: PASSWORD.to_string(),
                    name: handle.to_uppercase(),
                },
                device("register"),
            )
            .await
            .expect("Failed to register test user")
    }

    pub async fn login(&self, handle: &str) -> AuthResult {
        self.services
            .auth
            .login(
                LoginRequest {
                    email: format!("{handle}@x.com"),
                    password: PASSWORD.to_string(),
                },
                device("login"),
            )
            .await
            .expect("Failed to log in test user")
    }

    /// Authenticate an access token the way a request would be
    pub async fn context(&self, access_token: &str) -> Result<RequestContext, AppError> {
        self.services
            .authenticator
            .authenticate(access_token, &device("request"))
            .await
    }

    /// Decode a token without consulting the blacklist
    pub fn claims(&self, token: &str, kind: TokenKind) -> Claims {
        JwtDecoder::new(&self.config.auth)
            .decode(token, kind)
            .expect("Token should decode")
    }
}

/// Config with a test secret and cheap Argon2 parameters
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret-value".to_string();
    config.auth.argon2_memory_kib = 1024;
    config.auth.argon2_iterations = 1;
    config.auth.argon2_parallelism = 1;
    config
}

pub fn device(user_agent: &str) -> DeviceInfo {
    DeviceInfo::new(Some(user_agent), Some("127.0.0.1"), Some("en"), Some("gzip"))
}

/// ID token assertion understood by [`FakeIdentityProvider`]
pub fn id_token(subject: &str, email: &str, name: &str) -> ProviderAssertion {
    ProviderAssertion::IdToken {
        id_token: format!("{subject}|{email}|{name}"),
    }
}

/// Accepts ID tokens of the form `subject|email|name`; anything else fails.
#[derive(Debug)]
pub struct FakeIdentityProvider;

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn provider(&self) -> AuthProvider {
        AuthProvider::Google
    }

    async fn verify(&self, assertion: &ProviderAssertion) -> Result<ExternalIdentity, AppError> {
        let invalid =
            || AppError::authentication(ErrorReason::InvalidAssertion, "Invalid ID token");
        let ProviderAssertion::IdToken { id_token } = assertion else {
            return Err(invalid());
        };
        let mut parts = id_token.splitn(3, '|');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(subject), Some(email), Some(name)) if !subject.is_empty() => Ok(ExternalIdentity {
                subject: subject.to_string(),
                email: email.to_string(),
                name: Some(name.to_string()).filter(|n| !n.is_empty()),
                picture: None,
            }),
            _ => Err(invalid()),
        }
    }
}
