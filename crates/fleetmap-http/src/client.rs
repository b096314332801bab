use fleetmap_core::{FleetmapError, Result};
use std::time::Duration;

/// Shared HTTP client with a client-wide request timeout
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FleetmapError::ConfigInvalid {
            key: "request_timeout_ms".to_string(),
            reason: format!("Failed to build HTTP client: {}", e),
        })
}

/// Strip trailing slashes so paths can be appended with `format!`
pub(crate) fn normalize_base(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}
