//! Session management configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions older than this many days are hard-deleted by the sweep,
    /// regardless of their active flag.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
        }
    }
}

fn default_retention_days() -> u32 {
    30
}
