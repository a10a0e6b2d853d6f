//! Session record.

use chrono::{DateTime, Utc};
use homelist_core::types::{Jti, SessionId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::device::DeviceInfo;

/// One login event on one device.
///
/// Created on every successful login, registration or federated exchange.
/// The access JTI is replaced on refresh; the refresh JTI is fixed for the
/// lifetime of the session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// The user this session belongs to.
    pub user_id: UserId,
    /// JTI of the access credential currently bound to the session.
    pub access_jti: Jti,
    /// JTI of the refresh credential issued at login.
    pub refresh_jti: Jti,
    /// Device fingerprint.
    #[sqlx(flatten)]
    pub device: DeviceInfo,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// Last activity timestamp.
    pub last_activity: DateTime<Utc>,
    /// Cleared on logout or explicit invalidation.
    pub is_active: bool,
    /// When the session was invalidated.
    pub invalidated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Open a new active session.
    pub fn new(
        user_id: UserId,
        access_jti: Jti,
        refresh_jti: Jti,
        device: DeviceInfo,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            access_jti,
            refresh_jti,
            device,
            created_at: now,
            last_activity: now,
            is_active: true,
            invalidated_at: None,
        }
    }

    /// Mark the session inactive. Returns `false` if it already was.
    pub fn invalidate(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        self.invalidated_at = Some(now);
        true
    }

    /// Whether the session falls outside the retention window.
    pub fn created_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.created_at < cutoff
    }

    /// Seconds since the last recorded activity.
    pub fn idle_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_activity).num_seconds().max(0)
    }
}
