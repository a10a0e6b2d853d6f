//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Maintenance scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduled sweeps run at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for the session retention sweep.
    #[serde(default = "default_session_sweep_cron")]
    pub session_sweep_cron: String,
    /// Cron expression (with seconds) for the blacklist expiry sweep.
    #[serde(default = "default_blacklist_sweep_cron")]
    pub blacklist_sweep_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            session_sweep_cron: default_session_sweep_cron(),
            blacklist_sweep_cron: default_blacklist_sweep_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_session_sweep_cron() -> String {
    // hourly, on the hour
    "0 0 * * * *".to_string()
}

fn default_blacklist_sweep_cron() -> String {
    "0 */15 * * * *".to_string()
}
