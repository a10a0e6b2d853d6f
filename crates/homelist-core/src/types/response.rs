//! Response bodies handed to the route layer.

use serde::{Deserialize, Serialize};

use crate::error::ErrorReason;

/// Standard error body returned across the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Error category (e.g. `"CONFLICT"`).
    pub error: String,
    /// Machine-readable reason.
    pub reason: ErrorReason,
    /// Human-readable message.
    pub message: String,
}
