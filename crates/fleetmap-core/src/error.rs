//! Error types for Fleetmap

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetmapError {
    // Registry errors
    #[error("Point not found: {id}")]
    PointNotFound { id: String },

    #[error("Invalid geometry for {context}: {reason}")]
    InvalidGeometry { context: String, reason: String },

    // Collaborator errors
    #[error("Catalog write failed for point {point_id}: {reason}")]
    CatalogWrite { point_id: String, reason: String },

    #[error("Catalog read failed: {reason}")]
    CatalogRead { reason: String },

    #[error("Optimization failed: {message}")]
    Optimization { message: String },

    #[error("Malformed optimization response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Road routing unavailable: {reason}")]
    RoadRouting { reason: String },

    // Workflow errors
    #[error("Cannot {event} while {state}")]
    InvalidTransition { state: String, event: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FleetmapError {
    /// Whether this error should be shown to the operator.
    ///
    /// Malformed records, spatial no-match and road-routing outages are
    /// recovered locally; catalog writes and optimization runs are not.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            FleetmapError::CatalogWrite { .. }
                | FleetmapError::CatalogRead { .. }
                | FleetmapError::Optimization { .. }
                | FleetmapError::MalformedResponse { .. }
        )
    }
}

impl From<serde_json::Error> for FleetmapError {
    fn from(err: serde_json::Error) -> Self {
        FleetmapError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FleetmapError>;
