//! Monitor response types.

use serde::{Deserialize, Serialize};

/// Service health status response.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    /// Whether the chat index is loaded and the service can answer.
    pub is_healthy: bool,
    /// Application version.
    pub version: String,
}

impl MonitorStatus {
    /// Creates a status for the running build.
    pub fn new(is_healthy: bool) -> Self {
        Self {
            is_healthy,
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}
