use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fleetmap - route geometry and spatial binding for service fleets
#[derive(Parser, Debug)]
#[command(name = "fleetmap")]
#[command(about = "Route geometry and spatial binding for service fleets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Catalog and optimization backend URL
    #[arg(long, global = true, value_name = "URL")]
    pub catalog_url: Option<String>,

    /// OSRM-compatible road router URL
    #[arg(long, global = true, value_name = "URL")]
    pub router_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve an optimization result and export it as GeoJSON
    Render(RenderArgs),

    /// Find the catalog point nearest to a coordinate
    Nearest(NearestArgs),

    /// Run an optimization for selected points
    Optimize(OptimizeArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Point records as a JSON array (fetched from the catalog when omitted)
    #[arg(long, value_name = "FILE")]
    pub points: Option<PathBuf>,

    /// Optimization result JSON
    #[arg(long, value_name = "FILE")]
    pub result: PathBuf,

    /// Highlight one vehicle
    #[arg(long, value_name = "ID")]
    pub vehicle: Option<u32>,

    /// Omit out-of-focus entities instead of dimming them
    #[arg(long, requires = "vehicle")]
    pub isolate: bool,

    /// Draw every leg as a straight line without contacting the road router
    #[arg(long)]
    pub offline: bool,

    /// Vehicle tank capacity in liters for urgency colors
    #[arg(long, value_name = "LITERS")]
    pub capacity: Option<f64>,

    /// Wait per road lookup before drawing a straight line
    #[arg(long, value_name = "MS")]
    pub lookup_timeout_ms: Option<u64>,

    /// Write the GeoJSON to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct NearestArgs {
    /// Point records as a JSON array (fetched from the catalog when omitted)
    #[arg(long, value_name = "FILE")]
    pub points: Option<PathBuf>,

    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Match tolerance in meters
    #[arg(long, default_value_t = fleetmap_core::geo::DEFAULT_MATCH_TOLERANCE_M)]
    pub tolerance: f64,
}

#[derive(Parser, Debug)]
pub struct OptimizeArgs {
    /// Number of vehicles
    #[arg(long, default_value_t = 1)]
    pub vehicles: u32,

    /// Point ids to visit
    #[arg(long, num_args = 1.., value_name = "ID", required_unless_present = "all_parks")]
    pub select: Vec<String>,

    /// Select every park in the catalog
    #[arg(long)]
    pub all_parks: bool,

    /// Write the result JSON to a file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: Option<PathBuf>,
}
