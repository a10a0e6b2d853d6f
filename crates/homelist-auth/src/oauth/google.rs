//! Google OpenID Connect identity provider.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use homelist_core::config::GoogleOAuthConfig;
use homelist_core::error::{AppError, ErrorKind, ErrorReason};
use homelist_entity::user::AuthProvider;

use super::provider::{ExternalIdentity, IdentityProvider, ProviderAssertion};

/// Unknown `kid`s inside this window after a fetch are rejected from cache.
const JWKS_MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

/// Exchanges authorization codes and verifies RS256 ID tokens against the
/// Google JWKS, issuer list and the configured client id.
pub struct GoogleIdentityProvider {
    config: GoogleOAuthConfig,
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
    /// Last fetched key set; refetched when a `kid` is missing.
    jwks: RwLock<KeyCache>,
}

#[derive(Default)]
struct KeyCache {
    set: Option<JwkSet>,
    fetched_at: Option<Instant>,
}

impl KeyCache {
    fn key(&self, kid: &str) -> Option<Result<DecodingKey, AppError>> {
        self.set
            .as_ref()
            .and_then(|set| set.find(kid))
            .map(|jwk| DecodingKey::from_jwk(jwk).map_err(|_| invalid("Unusable signing key")))
    }

    fn fetched_recently(&self, now: Instant) -> bool {
        self.fetched_at
            .is_some_and(|at| now.saturating_duration_since(at) < JWKS_MIN_REFETCH_INTERVAL)
    }
}

impl std::fmt::Debug for GoogleIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleIdentityProvider")
            .field("client_id", &self.client_id)
            .field("token_url", &self.config.token_url)
            .finish()
    }
}

impl GoogleIdentityProvider {
    pub fn new(config: &GoogleOAuthConfig) -> Result<Self, AppError> {
        let (Some(client_id), Some(client_secret)) =
            (config.client_id.clone(), config.client_secret.clone())
        else {
            return Err(AppError::configuration(
                "oauth.google.client_id and client_secret are required",
            ));
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            config: config.clone(),
            client_id,
            client_secret,
            http,
            jwks: RwLock::new(KeyCache::default()),
        })
    }

    /// URL that starts the authorization-code flow; `state` is echoed back
    /// to the redirect URI.
    pub fn authorization_url(&self, state: &str) -> Result<String, AppError> {
        reqwest::Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("access_type", "online"),
                ("state", state),
            ],
        )
        .map(String::from)
        .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Invalid oauth.google.auth_url", e))
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Token exchange failed", e)
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Authorization code rejected by provider");
            return Err(invalid("Authorization code was rejected"));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|_| invalid("Token endpoint returned no ID token"))?;
        Ok(body.id_token)
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AppError> {
        let jwks = self
            .http
            .get(&self.config.jwks_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::with_source(ErrorKind::ExternalService, "JWKS fetch failed", e))?
            .json::<JwkSet>()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "JWKS response is invalid", e)
            })?;
        debug!(keys = jwks.keys.len(), "Fetched provider signing keys");
        Ok(jwks)
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AppError> {
        if let Some(key) = self.jwks.read().await.key(kid) {
            return key;
        }

        let mut cache = self.jwks.write().await;
        if let Some(key) = cache.key(kid) {
            return key;
        }
        if cache.fetched_recently(Instant::now()) {
            debug!(kid, "Unknown signing key within refetch interval");
            return Err(invalid("Unknown signing key"));
        }

        let fresh = self.fetch_jwks().await?;
        cache.set = Some(fresh);
        cache.fetched_at = Some(Instant::now());
        cache.key(kid).unwrap_or_else(|| Err(invalid("Unknown signing key")))
    }

    async fn verify_id_token(&self, id_token: &str) -> Result<ExternalIdentity, AppError> {
        let header = decode_header(id_token).map_err(|_| invalid("Malformed ID token"))?;
        if header.alg != Algorithm::RS256 {
            return Err(invalid("Unexpected ID token algorithm"));
        }
        let kid = header.kid.ok_or_else(|| invalid("ID token has no key id"))?;
        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&self.config.issuers);

        let claims = decode::<GoogleClaims>(id_token, &key, &validation)
            .map_err(|e| {
                debug!(error = %e, "ID token verification failed");
                invalid("ID token verification failed")
            })?
            .claims;

        let email = match claims.email {
            Some(email) if claims.email_verified => email,
            _ => return Err(invalid("Provider did not assert a verified email")),
        };

        Ok(ExternalIdentity {
            subject: claims.sub,
            email,
            name: claims.name,
            picture: claims.picture,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn provider(&self) -> AuthProvider {
        AuthProvider::Google
    }

    async fn verify(&self, assertion: &ProviderAssertion) -> Result<ExternalIdentity, AppError> {
        let id_token = match assertion {
            ProviderAssertion::AuthorizationCode { code, redirect_uri } => {
                if code.trim().is_empty() {
                    return Err(invalid("Authorization code is required"));
                }
                let redirect = redirect_uri.as_deref().unwrap_or(&self.config.redirect_uri);
                self.exchange_code(code, redirect).await?
            }
            ProviderAssertion::IdToken { id_token } => id_token.clone(),
        };
        self.verify_id_token(&id_token).await
    }
}

fn invalid(message: &str) -> AppError {
    AppError::authentication(ErrorReason::InvalidAssertion, message)
}
