//! Nearest command implementation

use crate::cli::NearestArgs;
use crate::commands::load_registry;
use crate::output::OutputWriter;
use crate::output_types::NearestOutput;
use anyhow::Result;
use fleetmap_core::config::LayeredConfig;
use fleetmap_core::geo::find_nearest_with_distance;
use fleetmap_core::models::Coordinate;

pub async fn execute(args: NearestArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let registry = load_registry(args.points.as_deref(), config).await?;
    let click = Coordinate::new(args.lat, args.lon);

    let found = find_nearest_with_distance(click, registry.iter(), args.tolerance);

    if output.is_json() {
        return output.result(NearestOutput {
            point_id: found.map(|(p, _)| p.id.to_string()),
            name: found.and_then(|(p, _)| p.name.clone()),
            distance_m: found.map(|(_, d)| d),
            tolerance_m: args.tolerance,
        });
    }

    match found {
        Some((point, distance)) => {
            output.section("Nearest Point");
            output.kv("Id", &point.id);
            output.kv("Name", point.display_name());
            output.kv("Category", point.category.as_str());
            output.kv("Distance", format!("{:.1} m", distance));
        }
        None => output.warning(format!(
            "No eligible point within {} m of {}, {}",
            args.tolerance, args.lat, args.lon
        )),
    }
    Ok(())
}
