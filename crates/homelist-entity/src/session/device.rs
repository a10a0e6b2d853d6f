//! Device fingerprint captured at login.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Opaque request headers identifying the device a session was opened from.
///
/// Values are stored as presented; nothing here is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DeviceInfo {
    /// `User-Agent` header.
    pub user_agent: Option<String>,
    /// Client IP address as reported by the transport.
    pub ip_address: Option<String>,
    /// `Accept-Language` header.
    pub accept_language: Option<String>,
    /// `Accept-Encoding` header.
    pub accept_encoding: Option<String>,
}

impl DeviceInfo {
    /// Build a fingerprint from raw header values.
    pub fn new(
        user_agent: Option<&str>,
        ip_address: Option<&str>,
        accept_language: Option<&str>,
        accept_encoding: Option<&str>,
    ) -> Self {
        Self {
            user_agent: user_agent.map(str::to_owned),
            ip_address: ip_address.map(str::to_owned),
            accept_language: accept_language.map(str::to_owned),
            accept_encoding: accept_encoding.map(str::to_owned),
        }
    }
}
