use crate::client::normalize_base;
use async_trait::async_trait;
use fleetmap_core::models::{Coordinate, Shape};
use fleetmap_core::ports::RoadRouter;
use fleetmap_core::{FleetmapError, Result};
use serde::Deserialize;

/// OSRM road router
pub struct OsrmRouter {
    /// Base URL of the OSRM service (e.g., "https://router.project-osrm.org")
    base_url: String,

    /// Routing profile (e.g., "driving")
    profile: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OsrmRouter {
    pub fn new(base_url: impl Into<String>, profile: impl Into<String>, client: reqwest::Client) -> Self {
        Self { base_url: normalize_base(base_url), profile: profile.into(), client }
    }

    /// Public demo server with the driving profile
    pub fn public(client: reqwest::Client) -> Self {
        Self::new("https://router.project-osrm.org", "driving", client)
    }

    pub fn route_url(&self, from: Coordinate, to: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, self.profile, from.lon, from.lat, to.lon, to.lat
        )
    }
}

#[async_trait]
impl RoadRouter for OsrmRouter {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<Option<Shape>> {
        let response = self
            .client
            .get(self.route_url(from, to))
            .send()
            .await
            .map_err(|e| FleetmapError::RoadRouting {
                reason: format!("Failed to connect to OSRM at {}: {}", self.base_url, e),
            })?;

        if !response.status().is_success() {
            return Err(FleetmapError::RoadRouting {
                reason: format!("OSRM API error ({})", response.status()),
            });
        }

        let body: OsrmRouteResponse = response.json().await.map_err(|e| FleetmapError::RoadRouting {
            reason: format!("Failed to parse OSRM response: {}", e),
        })?;

        Ok(body.into_path())
    }
}

/// Response from the OSRM route API
#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: serde_json::Value,
}

impl OsrmRouteResponse {
    /// Geometry of the first route, if the service found one
    fn into_path(self) -> Option<Shape> {
        if self.code.as_deref().is_some_and(|c| c != "Ok") {
            return None;
        }
        let route = self.routes.into_iter().next()?;
        Shape::from_geojson(&route.geometry).filter(|s| !s.is_point())
    }
}
