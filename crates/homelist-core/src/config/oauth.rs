//! Federated identity configuration.

use serde::{Deserialize, Serialize};

/// Federated identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Link a federated identity to an existing local account with the same
    /// email instead of rejecting the login with `EmailCollision`.
    #[serde(default = "default_true")]
    pub link_existing_accounts: bool,
    /// Google OpenID Connect client.
    #[serde(default)]
    pub google: GoogleOAuthConfig,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            link_existing_accounts: true,
            google: GoogleOAuthConfig::default(),
        }
    }
}

/// Google OpenID Connect client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleOAuthConfig {
    /// OAuth client id; also the expected ID token audience.
    #[serde(default)]
    pub client_id: Option<String>,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Redirect URI registered with Google.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Authorization endpoint the user is redirected to.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Token endpoint used for the authorization-code exchange.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// JWKS endpoint used to verify ID token signatures.
    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,
    /// Accepted ID token issuers.
    #[serde(default = "default_issuers")]
    pub issuers: Vec<String>,
    /// HTTP timeout for provider calls, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GoogleOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: default_redirect_uri(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            jwks_url: default_jwks_url(),
            issuers: default_issuers(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl GoogleOAuthConfig {
    /// Whether client credentials are present.
    pub fn is_configured(&self) -> bool {
        self.client_id.as_deref().is_some_and(|s| !s.is_empty())
            && self.client_secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

fn default_true() -> bool {
    true
}

fn default_redirect_uri() -> String {
    "http://localhost:3000/auth/callback".to_string()
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_jwks_url() -> String {
    "https://www.googleapis.com/oauth2/v3/certs".to_string()
}

fn default_issuers() -> Vec<String> {
    vec![
        "https://accounts.google.com".to_string(),
        "accounts.google.com".to_string(),
    ]
}

fn default_timeout() -> u64 {
    10
}
