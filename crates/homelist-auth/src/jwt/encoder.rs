//! Credential issuance.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use homelist_core::config::AuthConfig;
use homelist_core::error::{AppError, ErrorKind};
use homelist_core::types::{Jti, UserId};
use homelist_entity::token::TokenKind;

use super::claims::Claims;

/// Mints HS256-signed credentials, each with a fresh random JTI.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// A signed credential and the values the caller needs to persist.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS string handed to the client.
    pub token: String,
    pub jti: Jti,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}

/// Access and refresh credentials minted together at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

impl JwtEncoder {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
        }
    }

    /// Lifetime of a credential of the given kind.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Sign a credential for `subject`. Signing failure is returned, never swallowed.
    pub fn issue(&self, subject: UserId, kind: TokenKind) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + self.ttl(kind);
        let claims = Claims {
            sub: subject,
            jti: Jti::new(),
            kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(
                ErrorKind::Internal,
                format!("Failed to encode {kind} token"),
                e,
            )
        })?;

        Ok(IssuedToken {
            token,
            jti: claims.jti,
            kind,
            expires_at,
        })
    }

    /// Sign a fresh access/refresh pair.
    pub fn issue_pair(&self, subject: UserId) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access: self.issue(subject, TokenKind::Access)?,
            refresh: self.issue(subject, TokenKind::Refresh)?,
        })
    }
}
