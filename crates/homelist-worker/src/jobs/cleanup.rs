//! Session retention and blacklist expiry sweeps.

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use homelist_auth::SessionCleanup;

use crate::executor::{JobExecutionError, JobHandler};

/// Hard-deletes sessions older than the retention window, active or not.
#[derive(Debug, Clone)]
pub struct SessionSweepJob {
    cleanup: SessionCleanup,
}

impl SessionSweepJob {
    pub const JOB_TYPE: &'static str = "session_sweep";

    pub fn new(cleanup: SessionCleanup) -> Self {
        Self { cleanup }
    }
}

#[async_trait]
impl JobHandler for SessionSweepJob {
    fn job_type(&self) -> &str {
        Self::JOB_TYPE
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        tracing::debug!("Running session sweep");
        let removed = self.cleanup.sweep_sessions().await?;
        Ok(serde_json::json!({
            "task": Self::JOB_TYPE,
            "sessions_removed": removed,
        }))
    }
}

/// Drops blacklist entries whose credentials have expired anyway.
#[derive(Debug, Clone)]
pub struct BlacklistSweepJob {
    cleanup: SessionCleanup,
}

impl BlacklistSweepJob {
    pub const JOB_TYPE: &'static str = "blacklist_sweep";

    pub fn new(cleanup: SessionCleanup) -> Self {
        Self { cleanup }
    }
}

#[async_trait]
impl JobHandler for BlacklistSweepJob {
    fn job_type(&self) -> &str {
        Self::JOB_TYPE
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        tracing::debug!("Running blacklist sweep");
        let removed = self.cleanup.sweep_blacklist().await?;
        Ok(serde_json::json!({
            "task": Self::JOB_TYPE,
            "entries_removed": removed,
        }))
    }
}
