use serde::Serialize;
use tabled::Tabled;

/// One vehicle row in a render summary
#[derive(Debug, Serialize, Tabled)]
pub struct RouteRow {
    #[tabled(rename = "Vehicle")]
    pub vehicle_id: u32,
    #[tabled(rename = "Color")]
    pub color: String,
    #[tabled(rename = "Stops")]
    pub stops: usize,
    #[tabled(rename = "Time (min)")]
    pub total_time_min: String,
    #[tabled(rename = "Shapes")]
    pub shapes: usize,
}

/// One vehicle row in an optimize summary
#[derive(Debug, Serialize, Tabled)]
pub struct OptimizedRouteRow {
    #[tabled(rename = "Vehicle")]
    pub vehicle_id: u32,
    #[tabled(rename = "Color")]
    pub color: String,
    #[tabled(rename = "Stops")]
    pub stops: usize,
    #[tabled(rename = "Time (min)")]
    pub total_time_min: String,
}

/// Output for render command
#[derive(Debug, Serialize)]
pub struct RenderOutput {
    pub out: String,
    pub features: usize,
    pub vehicles: Vec<RouteRow>,
    pub legend: bool,
}

/// Output for nearest command
#[derive(Debug, Serialize)]
pub struct NearestOutput {
    pub point_id: Option<String>,
    pub name: Option<String>,
    pub distance_m: Option<f64>,
    pub tolerance_m: f64,
}

/// One row of the config command
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
