//! Scheduled maintenance for HomeList.
//!
//! This crate provides:
//! - A job executor that dispatches maintenance jobs by type
//! - A cron scheduler that triggers them periodically
//! - The session retention sweep and the blacklist expiry sweep

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use jobs::{BlacklistSweepJob, SessionSweepJob};
pub use scheduler::CronScheduler;
