use crate::client::normalize_base;
use async_trait::async_trait;
use fleetmap_core::models::{PointId, Shape};
use fleetmap_core::ports::CatalogService;
use fleetmap_core::{FleetmapError, Result};

/// Catalog backend over HTTP
pub struct HttpCatalog {
    /// Base URL of the catalog backend (e.g., "http://localhost:8000")
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self { base_url: normalize_base(base_url), client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn geometry_url(&self, point_id: &PointId) -> String {
        format!("{}/parks/{}/geometry", self.base_url, point_id)
    }
}

#[async_trait]
impl CatalogService for HttpCatalog {
    async fn list_points(&self) -> Result<Vec<serde_json::Value>> {
        let response = self
            .client
            .get(format!("{}/nodes", self.base_url))
            .send()
            .await
            .map_err(|e| FleetmapError::CatalogRead {
                reason: format!("Failed to connect to catalog at {}: {}", self.base_url, e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(FleetmapError::CatalogRead {
                reason: format!("Catalog API error ({}): {}", status, error_text),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| FleetmapError::CatalogRead {
            reason: format!("Failed to parse catalog response: {}", e),
        })?;

        records_from_body(body)
    }

    async fn write_geometry(&self, point_id: &PointId, shape: &Shape) -> Result<()> {
        let write_error = |reason: String| FleetmapError::CatalogWrite {
            point_id: point_id.to_string(),
            reason,
        };

        let response = self
            .client
            .post(self.geometry_url(point_id))
            .json(shape)
            .send()
            .await
            .map_err(|e| write_error(format!("Failed to connect to catalog: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(write_error(format!("Catalog API error ({}): {}", status, error_text)));
        }

        tracing::debug!(point_id = %point_id, "Geometry written to catalog");
        Ok(())
    }
}

/// Accept either a bare array or an object wrapping one under `nodes`/`data`
fn records_from_body(body: serde_json::Value) -> Result<Vec<serde_json::Value>> {
    match body {
        serde_json::Value::Array(records) => Ok(records),
        serde_json::Value::Object(mut map) => ["nodes", "data"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(serde_json::Value::Array(records)) => Some(records),
                _ => None,
            })
            .ok_or_else(|| FleetmapError::CatalogRead {
                reason: "Catalog response has no point list".to_string(),
            }),
        _ => Err(FleetmapError::CatalogRead {
            reason: "Catalog response is not a JSON array".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_geometry_url() {
        let catalog = HttpCatalog::new("http://localhost:8000/", reqwest::Client::new());
        assert_eq!(catalog.base_url(), "http://localhost:8000");
        assert_eq!(catalog.geometry_url(&"15".into()), "http://localhost:8000/parks/15/geometry");
    }

    #[test]
    fn test_records_from_body() {
        assert_eq!(records_from_body(json!([{"id": 1}])).unwrap().len(), 1);
        assert_eq!(records_from_body(json!({"nodes": [{"id": 1}, {"id": 2}]})).unwrap().len(), 2);
        assert!(records_from_body(json!({"detail": "nope"})).is_err());
        assert!(records_from_body(json!("nodes")).is_err());
    }
}
