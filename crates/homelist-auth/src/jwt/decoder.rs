//! Credential verification.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use homelist_core::config::{AuthConfig, MAX_LEEWAY_SECONDS};
use homelist_core::error::{AppError, ErrorReason};
use homelist_entity::token::TokenKind;

use super::claims::Claims;

/// Verifies signature, expiry and declared kind.
///
/// Revocation is not checked here; callers consult the
/// [`RevocationRegistry`](crate::revocation::RevocationRegistry) fresh on
/// every request.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds.min(MAX_LEEWAY_SECONDS);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decode a credential and require it to be of `expected` kind.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                let message = match e.kind() {
                    JwtErrorKind::ExpiredSignature => "Token has expired",
                    JwtErrorKind::InvalidSignature => "Invalid token signature",
                    JwtErrorKind::InvalidToken | JwtErrorKind::Base64(_) => "Invalid token format",
                    _ => "Token validation failed",
                };
                AppError::authentication(ErrorReason::InvalidToken, message)
            })?
            .claims;

        if claims.kind != expected {
            return Err(AppError::authentication(
                ErrorReason::InvalidToken,
                format!("Invalid token type: expected {expected} token"),
            ));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use homelist_core::types::UserId;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "unit-test-secret-0123456789".into(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_round_trip_keeps_subject_and_jti() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());
        let user = UserId::new();
        let issued = encoder.issue(user, TokenKind::Access).expect("issue");
        let claims = decoder.decode(&issued.token, TokenKind::Access).expect("decode");
        assert_eq!(claims.sub, user);
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn test_kind_mismatch_is_invalid_token() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());
        let refresh = encoder.issue(UserId::new(), TokenKind::Refresh).expect("issue");
        let err = decoder.decode(&refresh.token, TokenKind::Access).unwrap_err();
        assert!(err.is(ErrorReason::InvalidToken));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let other = AuthConfig {
            jwt_secret: "some-other-secret-0123456789".into(),
            ..AuthConfig::default()
        };
        let issued = JwtEncoder::new(&other)
            .issue(UserId::new(), TokenKind::Access)
            .expect("issue");
        let err = JwtDecoder::new(&config())
            .decode(&issued.token, TokenKind::Access)
            .unwrap_err();
        assert!(err.is(ErrorReason::InvalidToken));
        assert!(JwtDecoder::new(&config()).decode("garbage", TokenKind::Access).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = AuthConfig {
            access_ttl_seconds: 0,
            leeway_seconds: 0,
            ..config()
        };
        let issued = JwtEncoder::new(&expired)
            .issue(UserId::new(), TokenKind::Access)
            .expect("issue");
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let err = JwtDecoder::new(&expired)
            .decode(&issued.token, TokenKind::Access)
            .unwrap_err();
        assert!(err.is(ErrorReason::InvalidToken));
    }
}
