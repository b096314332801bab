//! Render command implementation

use crate::cli::RenderArgs;
use crate::commands::{load_registry, read_json};
use crate::config_loader::http_client;
use crate::output::OutputWriter;
use crate::output_types::{RenderOutput, RouteRow};
use anyhow::{Context, Result};
use fleetmap_core::colors::route_color;
use fleetmap_core::config::LayeredConfig;
use fleetmap_core::focus::HighlightSelector;
use fleetmap_core::models::{OptimizeResponse, VehicleId};
use fleetmap_core::ports::{RoadRouter, StraightLineRouter};
use fleetmap_core::resolve::RouteGeometryResolver;
use fleetmap_core::session::RouteSession;
use fleetmap_http::OsrmRouter;
use std::fs;

pub async fn execute(args: RenderArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let registry = load_registry(args.points.as_deref(), config).await?;
    let response = OptimizeResponse::from_json(read_json(&args.result)?)
        .with_context(|| format!("Invalid optimization result in {}", args.result.display()))?;

    let mut session = RouteSession::new(registry);
    session.load_result(response);

    if let Some(v) = args.vehicle {
        if session.result().and_then(|r| r.route(VehicleId(v))).is_none() {
            output.warning(format!("Vehicle {} has no route in this result", v));
        }
        session.set_selector(HighlightSelector::vehicle(VehicleId(v)).with_isolate(args.isolate));
    }

    if args.offline {
        resolve(&mut session, StraightLineRouter, config).await;
    } else {
        let router = OsrmRouter::new(
            config.road_router_url.value.clone(),
            config.road_profile.value.clone(),
            http_client(config)?,
        );
        resolve(&mut session, router, config).await;
    }

    let scene = session
        .render(config.vehicle_capacity_l.value)
        .context("Route geometry was not resolved")?;
    let feature_count = scene.features.len();
    let legend = scene.foreign_members.is_some();
    let geojson = serde_json::to_string_pretty(&scene)?;

    let Some(out) = args.out else {
        println!("{}", geojson);
        return Ok(());
    };
    fs::write(&out, geojson).with_context(|| format!("Failed to write {}", out.display()))?;

    let rows = summary_rows(&session);
    if output.is_json() {
        output.result(RenderOutput {
            out: out.display().to_string(),
            features: feature_count,
            vehicles: rows,
            legend,
        })?;
    } else {
        output.success(format!("Wrote {} features to {}", feature_count, out.display()));
        output.table(rows)?;
    }
    Ok(())
}

async fn resolve<R: RoadRouter>(session: &mut RouteSession, router: R, config: &LayeredConfig) {
    let resolver = RouteGeometryResolver::new(router)
        .with_lookup_timeout(config.lookup_timeout())
        .with_max_concurrent(config.max_concurrent_lookups.value);
    session.resolve(&resolver).await;
}

fn summary_rows(session: &RouteSession) -> Vec<RouteRow> {
    let Some(result) = session.result() else {
        return Vec::new();
    };
    let visibility = session.visibility();

    result
        .routes
        .iter()
        .enumerate()
        .filter(|(_, r)| visibility.segment(r.vehicle_id).is_rendered())
        .map(|(i, r)| RouteRow {
            vehicle_id: r.vehicle_id.0,
            color: route_color(i).to_hex(),
            stops: r.sequence.len(),
            total_time_min: format!("{:.1}", r.total_time_min),
            shapes: session.geometry().and_then(|g| g.get(r.vehicle_id)).map_or(0, |s| s.len()),
        })
        .collect()
}
