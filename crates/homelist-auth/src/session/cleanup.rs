//! Periodic session and blacklist cleanup.

use chrono::Utc;
use tracing::info;

use homelist_core::error::AppError;

use crate::revocation::RevocationRegistry;

use super::manager::SessionManager;

/// Counts from one cleanup cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub sessions_deleted: u64,
    pub blacklist_deleted: u64,
}

/// Runs the retention sweep over sessions and the expiry sweep over the blacklist.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    sessions: SessionManager,
    registry: RevocationRegistry,
    retention_days: u32,
}

impl SessionCleanup {
    pub fn new(sessions: SessionManager, registry: RevocationRegistry, retention_days: u32) -> Self {
        Self {
            sessions,
            registry,
            retention_days,
        }
    }

    /// Delete sessions past the retention window.
    pub async fn sweep_sessions(&self) -> Result<u64, AppError> {
        self.sessions.sweep_expired(self.retention_days).await
    }

    /// Delete blacklist entries past their expiry.
    pub async fn sweep_blacklist(&self) -> Result<u64, AppError> {
        self.registry.sweep_expired(Utc::now()).await
    }

    /// Run both sweeps once.
    pub async fn run_once(&self) -> Result<CleanupReport, AppError> {
        let report = CleanupReport {
            sessions_deleted: self.sweep_sessions().await?,
            blacklist_deleted: self.sweep_blacklist().await?,
        };
        info!(
            sessions_deleted = report.sessions_deleted,
            blacklist_deleted = report.blacklist_deleted,
            "Cleanup cycle completed"
        );
        Ok(report)
    }
}
