use crate::client::normalize_base;
use async_trait::async_trait;
use fleetmap_core::models::{OptimizeRequest, OptimizeResponse};
use fleetmap_core::ports::Optimizer;
use fleetmap_core::{FleetmapError, Result};

/// Optimization service over HTTP
pub struct HttpOptimizer {
    /// Base URL of the optimization backend (e.g., "http://localhost:8000")
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpOptimizer {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self { base_url: normalize_base(base_url), client }
    }
}

#[async_trait]
impl Optimizer for HttpOptimizer {
    async fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse> {
        tracing::info!(
            vehicles = request.vehicle_count,
            points = request.selected_point_ids.len(),
            "Requesting route optimization"
        );

        let response = self
            .client
            .post(format!("{}/optimize", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| FleetmapError::Optimization {
                message: format!("Failed to reach optimization service at {}: {}", self.base_url, e),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| FleetmapError::Optimization {
            message: format!("Failed to read optimization response: {}", e),
        })?;

        if !status.is_success() {
            return Err(FleetmapError::Optimization { message: error_detail(status.as_u16(), &text) });
        }

        let body: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| FleetmapError::MalformedResponse {
                reason: e.to_string(),
            })?;
        OptimizeResponse::from_json(body)
    }
}

/// Diagnostic message for a failed run: the body's `detail`, else the raw body
fn error_detail(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|v| {
        match v.get("detail")? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    });

    match detail {
        Some(detail) => detail,
        None if body.trim().is_empty() => format!("HTTP {}", status),
        None => format!("HTTP {}: {}", status, body.trim()),
    }
}
