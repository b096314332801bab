use crate::error::Result;
use crate::models::{Coordinate, Shape};
use async_trait::async_trait;

/// Port for road-network path lookups
#[async_trait]
pub trait RoadRouter: Send + Sync {
    /// Path between two coordinates in longitude-latitude order
    ///
    /// `Ok(None)` means the service answered without a path. Callers treat it
    /// the same as an error.
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<Option<Shape>>;
}

/// Router that never consults a road network
///
/// Every leg resolves to the straight-line fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineRouter;

#[async_trait]
impl RoadRouter for StraightLineRouter {
    async fn route(&self, _from: Coordinate, _to: Coordinate) -> Result<Option<Shape>> {
        Ok(None)
    }
}
