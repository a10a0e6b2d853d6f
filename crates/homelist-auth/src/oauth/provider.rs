//! Identity provider seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use homelist_core::error::AppError;
use homelist_entity::user::AuthProvider;

/// What the client brings back from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderAssertion {
    /// An authorization code to exchange at the token endpoint.
    AuthorizationCode {
        code: String,
        /// Overrides the configured redirect URI when present.
        redirect_uri: Option<String>,
    },
    /// An ID token obtained directly by the client.
    IdToken { id_token: String },
}

/// A verified identity asserted by an external provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    /// Stable subject id at the provider.
    pub subject: String,
    /// Verified email address.
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Turns a provider assertion into a verified identity.
///
/// Any verification failure must be an `Authentication` error with reason
/// `InvalidAssertion`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn provider(&self) -> AuthProvider;

    async fn verify(&self, assertion: &ProviderAssertion) -> Result<ExternalIdentity, AppError>;
}
