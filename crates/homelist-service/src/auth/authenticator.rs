//! Turns a presented access token into a [`RequestContext`].

use std::sync::Arc;

use tracing::debug;

use homelist_auth::{JwtDecoder, RevocationRegistry, SessionManager};
use homelist_core::error::{AppError, ErrorReason};
use homelist_database::repositories::UserRepository;
use homelist_entity::session::DeviceInfo;
use homelist_entity::token::TokenKind;

use crate::context::RequestContext;

/// Per-request authentication check.
///
/// Every call consults the blacklist; nothing is cached between requests.
#[derive(Clone)]
pub struct Authenticator {
    decoder: JwtDecoder,
    registry: RevocationRegistry,
    sessions: SessionManager,
    users: Arc<dyn UserRepository>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(
        decoder: JwtDecoder,
        registry: RevocationRegistry,
        sessions: SessionManager,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            decoder,
            registry,
            sessions,
            users,
        }
    }

    /// Verify signature, expiry and kind, reject revoked JTIs, load the
    /// user and touch the session the token belongs to.
    pub async fn authenticate(
        &self,
        access_token: &str,
        device: &DeviceInfo,
    ) -> Result<RequestContext, AppError> {
        let claims = self.decoder.decode(access_token, TokenKind::Access)?;
        self.registry.ensure_not_revoked(claims.jti).await?;

        let user = self
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication(ErrorReason::InvalidToken, "User not found"))?;

        let session_id = match self.sessions.find_by_access_jti(claims.jti).await? {
            Some(session) if session.user_id == user.id => {
                if session.device.user_agent != device.user_agent {
                    debug!(
                        session_id = %session.id,
                        "Request user agent differs from the session's"
                    );
                }
                self.sessions.touch_activity(session.id).await?;
                Some(session.id)
            }
            _ => None,
        };

        Ok(RequestContext::new(
            user.id,
            session_id,
            claims.jti,
            claims.issued_at(),
        ))
    }
}
