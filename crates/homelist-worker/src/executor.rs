//! Job executor: dispatches jobs to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use homelist_core::error::AppError;

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes
    fn job_type(&self) -> &str;

    /// Run the job once and report what it did
    async fn execute(&self) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// No handler for the requested type
    #[error("Unknown job type: {0}")]
    UnknownJob(String),

    /// Store or other internal failure; the next tick retries
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Dispatches jobs to the appropriate handler based on job type
#[derive(Debug, Default)]
pub struct JobExecutor {
    /// Registered job handlers by type
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    /// Create a new job executor
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job handler
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        tracing::info!(job_type = %job_type, "Registered job handler");
        self.handlers.insert(job_type, handler);
    }

    /// Registered job types, sorted
    pub fn job_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Execute a job by dispatching to the correct handler
    pub async fn execute(&self, job_type: &str) -> Result<Value, JobExecutionError> {
        let handler = self
            .handlers
            .get(job_type)
            .ok_or_else(|| JobExecutionError::UnknownJob(job_type.to_string()))?;

        tracing::debug!(job_type = %job_type, "Executing job");
        let result = handler.execute().await;
        match &result {
            Ok(output) => tracing::info!(job_type = %job_type, output = %output, "Job completed"),
            Err(e) => tracing::error!(job_type = %job_type, error = %e, "Job failed"),
        }
        result
    }

    /// Run every registered job once, in type order
    pub async fn run_all(&self) -> Vec<(String, Result<Value, JobExecutionError>)> {
        let mut results = Vec::with_capacity(self.handlers.len());
        for job_type in self.job_types() {
            results.push((job_type.to_string(), self.execute(job_type).await));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(&'static str);

    #[async_trait]
    impl JobHandler for Fixed {
        fn job_type(&self) -> &str {
            self.0
        }

        async fn execute(&self) -> Result<Value, JobExecutionError> {
            Ok(serde_json::json!({ "task": self.0 }))
        }
    }

    #[tokio::test]
    async fn test_dispatches_by_type() {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(Fixed("b")));
        executor.register(Arc::new(Fixed("a")));

        assert_eq!(executor.job_types(), vec!["a", "b"]);
        let out = executor.execute("b").await.expect("run");
        assert_eq!(out["task"], "b");

        let all = executor.run_all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "a");
    }

    #[tokio::test]
    async fn test_unknown_type_is_an_error() {
        let executor = JobExecutor::new();
        let err = executor.execute("missing").await.unwrap_err();
        assert!(matches!(err, JobExecutionError::UnknownJob(t) if t == "missing"));
    }
}
