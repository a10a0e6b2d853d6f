//! Listing and revoking the caller's own sessions.

use tracing::info;

use homelist_auth::SessionManager;
use homelist_core::error::AppError;
use homelist_core::types::SessionId;
use homelist_entity::session::Session;

use crate::auth::TokenRevoker;
use crate::context::RequestContext;

/// Session viewing and revocation, scoped to the caller.
#[derive(Debug, Clone)]
pub struct SessionService {
    /// Session manager.
    sessions: SessionManager,
    /// Blacklists the JTIs of revoked sessions.
    revoker: TokenRevoker,
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(sessions: SessionManager, revoker: TokenRevoker) -> Self {
        Self { sessions, revoker }
    }

    /// The caller's sessions, most recent activity first.
    pub async fn list_my_sessions(
        &self,
        ctx: &RequestContext,
        active_only: bool,
    ) -> Result<Vec<Session>, AppError> {
        self.sessions.list_sessions(ctx.user_id, active_only).await
    }

    /// End one of the caller's sessions and blacklist its credentials.
    ///
    /// Sessions of other users are reported as not found.
    pub async fn revoke_session(
        &self,
        ctx: &RequestContext,
        session_id: SessionId,
    ) -> Result<Session, AppError> {
        self.sessions
            .get(session_id)
            .await?
            .filter(|s| s.user_id == ctx.user_id)
            .ok_or_else(|| AppError::not_found("Session not found"))?;

        let session = self
            .sessions
            .invalidate(session_id)
            .await?
            .ok_or_else(|| AppError::not_found("Session not found"))?;
        self.revoker.revoke_session(&session).await?;

        info!(
            user_id = %ctx.user_id,
            session_id = %session_id,
            current = ctx.is_current_session(session_id),
            "Session revoked"
        );
        Ok(session)
    }
}
