//! Authentication configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Largest accepted access token lifetime (one year).
pub const MAX_ACCESS_TTL_SECONDS: u64 = 365 * 24 * 3600;
/// Largest accepted refresh token lifetime (ten years).
pub const MAX_REFRESH_TTL_DAYS: u64 = 3650;
/// Largest accepted clock skew (one hour).
pub const MAX_LEEWAY_SECONDS: u64 = 3600;

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Clock skew tolerated when checking `exp`, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn score (0-4). `0` disables the entropy check.
    #[serde(default)]
    pub password_min_strength: u8,
    /// Argon2id memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2id iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2id degree of parallelism.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_seconds: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            leeway_seconds: default_leeway(),
            password_min_length: default_password_min(),
            password_min_strength: 0,
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl AuthConfig {
    /// Access token lifetime, capped at [`MAX_ACCESS_TTL_SECONDS`].
    pub fn access_ttl(&self) -> Duration {
        bounded_seconds(self.access_ttl_seconds, MAX_ACCESS_TTL_SECONDS)
    }

    /// Refresh token lifetime, capped at [`MAX_REFRESH_TTL_DAYS`].
    pub fn refresh_ttl(&self) -> Duration {
        Duration::days(i64::try_from(self.refresh_ttl_days.min(MAX_REFRESH_TTL_DAYS)).unwrap_or(0))
    }

    /// Clock skew tolerated past `exp`, capped at [`MAX_LEEWAY_SECONDS`].
    pub fn leeway(&self) -> Duration {
        bounded_seconds(self.leeway_seconds, MAX_LEEWAY_SECONDS)
    }
}

fn bounded_seconds(value: u64, max: u64) -> Duration {
    Duration::seconds(i64::try_from(value.min(max)).unwrap_or(0))
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    3600
}

fn default_refresh_ttl() -> u64 {
    30
}

fn default_leeway() -> u64 {
    5
}

fn default_password_min() -> usize {
    8
}

fn default_argon2_memory() -> u32 {
    19 * 1024
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}
