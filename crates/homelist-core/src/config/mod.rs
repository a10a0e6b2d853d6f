//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every section has defaults so a missing file still loads.

pub mod auth;
pub mod database;
pub mod logging;
pub mod oauth;
pub mod session;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::auth::{
    AuthConfig, MAX_ACCESS_TTL_SECONDS, MAX_LEEWAY_SECONDS, MAX_REFRESH_TTL_DAYS,
};
pub use self::database::{DatabaseConfig, StoreBackend};
pub use self::logging::LoggingConfig;
pub use self::oauth::{GoogleOAuthConfig, OAuthConfig};
pub use self::session::SessionConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Store connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Credential and password settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session retention settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Federated identity settings.
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// Maintenance scheduler settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `HOMELIST__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("HOMELIST")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("oauth.google.issuers")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make the auth subsystem unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.len() < 16 {
            return Err(AppError::configuration(
                "auth.jwt_secret must be at least 16 bytes",
            ));
        }
        if self.auth.access_ttl_seconds == 0 || self.auth.refresh_ttl_days == 0 {
            return Err(AppError::configuration("token lifetimes must be non-zero"));
        }
        if self.auth.access_ttl_seconds > MAX_ACCESS_TTL_SECONDS {
            return Err(AppError::configuration(format!(
                "auth.access_ttl_seconds must be at most {MAX_ACCESS_TTL_SECONDS}"
            )));
        }
        if self.auth.refresh_ttl_days > MAX_REFRESH_TTL_DAYS {
            return Err(AppError::configuration(format!(
                "auth.refresh_ttl_days must be at most {MAX_REFRESH_TTL_DAYS}"
            )));
        }
        if self.auth.leeway_seconds > MAX_LEEWAY_SECONDS {
            return Err(AppError::configuration(format!(
                "auth.leeway_seconds must be at most {MAX_LEEWAY_SECONDS}"
            )));
        }
        if self.auth.password_min_strength > 4 {
            return Err(AppError::configuration(
                "auth.password_min_strength must be between 0 and 4",
            ));
        }
        if self.session.retention_days == 0 {
            return Err(AppError::configuration(
                "session.retention_days must be non-zero",
            ));
        }
        Ok(())
    }
}
