use crate::error::Result;
use crate::models::{PointId, Shape};
use async_trait::async_trait;

/// Port for the point catalog
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch every point record in its raw backend form
    async fn list_points(&self) -> Result<Vec<serde_json::Value>>;

    /// Persist a geometry override for a point
    async fn write_geometry(&self, point_id: &PointId, shape: &Shape) -> Result<()>;
}
