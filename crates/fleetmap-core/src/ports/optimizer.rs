use crate::error::Result;
use crate::models::{OptimizeRequest, OptimizeResponse};
use async_trait::async_trait;

/// Port for the route optimization service
#[async_trait]
pub trait Optimizer: Send + Sync {
    /// Run an optimization for the selected points
    ///
    /// Failures carry the service's diagnostic message when one is available.
    async fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse>;
}
