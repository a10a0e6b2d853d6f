//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use homelist_core::config::WorkerConfig;
use homelist_core::error::AppError;

use crate::executor::JobExecutor;
use crate::jobs::{BlacklistSweepJob, SessionSweepJob};

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Executor the scheduled ticks dispatch to
    executor: Arc<JobExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("executor", &self.executor)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<JobExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register the session and blacklist sweeps on their configured schedules
    pub async fn register_maintenance_tasks(&self, config: &WorkerConfig) -> Result<(), AppError> {
        self.schedule(SessionSweepJob::JOB_TYPE, &config.session_sweep_cron)
            .await?;
        self.schedule(BlacklistSweepJob::JOB_TYPE, &config.blacklist_sweep_cron)
            .await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Run `job_type` on every tick of `cron` (six fields, seconds first)
    pub async fn schedule(&self, job_type: &str, cron: &str) -> Result<(), AppError> {
        if !self.executor.job_types().contains(&job_type) {
            return Err(AppError::configuration(format!(
                "No handler registered for scheduled job '{job_type}'"
            )));
        }

        let executor = Arc::clone(&self.executor);
        let name = job_type.to_string();
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let name = name.clone();
            Box::pin(async move {
                // Failures are logged by the executor; the next tick retries.
                let _ = executor.execute(&name).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid schedule '{cron}' for {job_type}: {e}"))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add {job_type} schedule: {e}"))
        })?;

        tracing::info!(job_type = %job_type, cron = %cron, "Registered scheduled job");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
