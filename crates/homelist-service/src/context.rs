//! Request context carrying the authenticated user and session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homelist_core::types::{Jti, SessionId, UserId};

/// Context for the current authenticated request.
///
/// Produced by [`Authenticator`](crate::auth::Authenticator) and passed
/// into service methods so that every operation knows *who* is acting and
/// from *which* session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The session the access token belongs to, if one is on record.
    pub session_id: Option<SessionId>,
    /// JTI of the presented access token.
    pub jti: Jti,
    /// When the access token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: UserId,
        session_id: Option<SessionId>,
        jti: Jti,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            session_id,
            jti,
            issued_at,
            request_time: Utc::now(),
        }
    }

    /// Whether `session_id` is the session this request arrived on.
    pub fn is_current_session(&self, session_id: SessionId) -> bool {
        self.session_id == Some(session_id)
    }
}
