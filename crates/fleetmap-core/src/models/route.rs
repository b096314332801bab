use crate::error::{FleetmapError, Result};
use crate::models::point::PointId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Separator between a point id and its revisit index (`"12#2"`)
pub const REVISIT_SEPARATOR: char = '#';

/// Vehicle identifier as assigned by the optimization service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub u32);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decoded route sequence reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StopRef {
    pub base_id: PointId,
    /// 0 when the reference carries no revisit suffix
    pub visit_index: u32,
}

impl StopRef {
    /// Decode `"<id>"` or `"<id>#<k>"`
    ///
    /// A suffix that is not a number is still stripped from the base id.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(REVISIT_SEPARATOR) {
            Some((base, suffix)) => Self {
                base_id: PointId::new(base),
                visit_index: suffix.parse().unwrap_or(0),
            },
            None => Self { base_id: PointId::new(raw), visit_index: 0 },
        }
    }

    pub fn is_revisit(&self) -> bool {
        self.visit_index > 0
    }
}

/// One vehicle's route from an optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub vehicle_id: VehicleId,
    pub sequence: Vec<String>,
    pub total_time_min: f64,
    pub load_profile_liters: Vec<f64>,
}

impl Route {
    /// Decoded sequence references, in visit order
    pub fn stops(&self) -> Vec<StopRef> {
        self.sequence.iter().map(|raw| StopRef::parse(raw)).collect()
    }

    /// Base point ids appearing anywhere in the sequence
    pub fn base_ids(&self) -> BTreeSet<PointId> {
        self.sequence.iter().map(|raw| StopRef::parse(raw).base_id).collect()
    }

    /// Load on board when arriving at stop `index`
    ///
    /// This is the load recorded after the previous stop. The first stop has
    /// no predecessor.
    pub fn load_before(&self, index: usize) -> Option<f64> {
        if index == 0 || index > self.load_profile_liters.len() {
            return None;
        }
        self.load_profile_liters.get(index - 1).copied()
    }

    /// Sequence and load profile must line up
    pub fn validate(&self) -> Result<()> {
        if self.sequence.len() != self.load_profile_liters.len() {
            return Err(FleetmapError::MalformedResponse {
                reason: format!(
                    "vehicle {} has {} stops but {} load entries",
                    self.vehicle_id,
                    self.sequence.len(),
                    self.load_profile_liters.len()
                ),
            });
        }
        Ok(())
    }
}

/// Request payload for the optimization service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    #[serde(rename = "num_vehicles")]
    pub vehicle_count: u32,
    #[serde(rename = "selected_node_ids")]
    pub selected_point_ids: Vec<PointId>,
}

impl OptimizeRequest {
    pub fn new(vehicle_count: u32, selected_point_ids: Vec<PointId>) -> Result<Self> {
        if vehicle_count < 1 {
            return Err(FleetmapError::Optimization {
                message: "vehicle count must be at least 1".to_string(),
            });
        }
        if selected_point_ids.is_empty() {
            return Err(FleetmapError::Optimization {
                message: "no points selected".to_string(),
            });
        }
        Ok(Self { vehicle_count, selected_point_ids })
    }
}

/// Response from the optimization service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub objective_time_min: f64,
    #[serde(rename = "vehicle_used", alias = "vehicles_used")]
    pub vehicles_used: u32,
    pub routes: Vec<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<serde_json::Value>,
}

impl OptimizeResponse {
    /// Parse and validate a raw response body
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let response: OptimizeResponse =
            serde_json::from_value(value).map_err(|e| FleetmapError::MalformedResponse {
                reason: e.to_string(),
            })?;
        response.validate()?;
        Ok(response)
    }

    pub fn validate(&self) -> Result<()> {
        self.routes.iter().try_for_each(Route::validate)
    }

    pub fn route(&self, vehicle: VehicleId) -> Option<&Route> {
        self.routes.iter().find(|r| r.vehicle_id == vehicle)
    }

    /// Position of a vehicle's route in the result, used for palette lookup
    pub fn route_index(&self, vehicle: VehicleId) -> Option<usize> {
        self.routes.iter().position(|r| r.vehicle_id == vehicle)
    }

    pub fn total_stops(&self) -> usize {
        self.routes.iter().map(|r| r.sequence.len()).sum()
    }
}
