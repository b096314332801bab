//! Optimize command implementation

use crate::cli::OptimizeArgs;
use crate::config_loader::http_client;
use crate::output::OutputWriter;
use crate::output_types::OptimizedRouteRow;
use anyhow::{Context, Result};
use fleetmap_core::colors::route_color;
use fleetmap_core::config::LayeredConfig;
use fleetmap_core::models::{Category, PointId};
use fleetmap_core::session::RouteSession;
use fleetmap_http::{HttpCatalog, HttpOptimizer};
use std::fs;

pub async fn execute(args: OptimizeArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let client = http_client(config)?;
    let base_url = config.catalog_url.value.clone();

    let mut ids: Vec<PointId> = args.select.iter().map(PointId::new).collect();
    let mut session = if args.all_parks {
        let catalog = HttpCatalog::new(base_url.clone(), client.clone());
        let session = RouteSession::load(&catalog).await.context("Failed to load catalog")?;
        ids.extend(
            session
                .registry()
                .iter()
                .filter(|p| p.category == Category::Park)
                .map(|p| p.id.clone()),
        );
        session
    } else {
        RouteSession::default()
    };
    session.selection_mut().apply_group(ids);

    output.info(format!(
        "Optimizing {} points with {} vehicle(s)",
        session.selection().len(),
        args.vehicles
    ));

    let optimizer = HttpOptimizer::new(base_url, client);
    let result = session.optimize_selection(&optimizer, args.vehicles).await?;

    let rows: Vec<OptimizedRouteRow> = result
        .routes
        .iter()
        .enumerate()
        .map(|(i, r)| OptimizedRouteRow {
            vehicle_id: r.vehicle_id.0,
            color: route_color(i).to_hex(),
            stops: r.sequence.len(),
            total_time_min: format!("{:.1}", r.total_time_min),
        })
        .collect();

    if let Some(out) = &args.out {
        fs::write(out, serde_json::to_string_pretty(result)?)
            .with_context(|| format!("Failed to write {}", out.display()))?;
    }

    if output.is_json() {
        output.result(result)?;
    } else {
        output.success(format!(
            "Objective {:.1} min using {} vehicle(s)",
            result.objective_time_min, result.vehicles_used
        ));
        output.table(rows)?;
        if let Some(out) = &args.out {
            output.info(format!("Result written to {}", out.display()));
        }
    }
    Ok(())
}
