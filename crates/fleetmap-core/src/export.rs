//! GeoJSON render scene for an optimization result.

use crate::colors::{
    demand_color, route_color, urgency, urgency_label, urgency_ramp, DemandTier, ROUTE_PALETTE,
};
use crate::focus::VisibilityDecision;
use crate::geo::shape_bounds;
use crate::models::{Category, OptimizeResponse, Shape};
use crate::registry::PointRegistry;
use crate::resolve::ResolvedGeometry;
use geojson::{Feature, FeatureCollection};
use serde_json::{json, Map, Value as JsonValue};

/// Build the render scene: route paths, involved points and refill urgency
/// markers, with visibility applied
pub fn render_feature_collection(
    result: &OptimizeResponse,
    geometry: &ResolvedGeometry,
    registry: &PointRegistry,
    visibility: &VisibilityDecision<'_>,
    vehicle_capacity_l: f64,
) -> FeatureCollection {
    let mut features = Vec::new();

    for (index, route) in result.routes.iter().enumerate() {
        let Some(style) = visibility.segment(route.vehicle_id).segment_style() else {
            continue;
        };
        let color = route_color(index);

        for shape in geometry.get(route.vehicle_id).unwrap_or_default() {
            let mut properties = Map::new();
            properties.insert("kind".to_string(), JsonValue::from("route"));
            properties.insert("vehicle_id".to_string(), JsonValue::from(route.vehicle_id.0));
            properties.insert("color".to_string(), JsonValue::from(color.to_hex()));
            properties.insert("weight".to_string(), JsonValue::from(style.weight));
            properties.insert("opacity".to_string(), JsonValue::from(style.opacity));
            features.push(feature(shape, properties));
        }
    }

    let mut rendered_shapes = Vec::new();
    for (id, vis) in visibility.rendered_points() {
        let (Some(point), Some(style)) = (registry.get(&id), vis.point_style()) else {
            continue;
        };
        let shape = point.effective_geometry();

        let mut properties = Map::new();
        properties.insert("kind".to_string(), JsonValue::from("point"));
        properties.insert("point_id".to_string(), JsonValue::from(point.id.as_str()));
        properties.insert("name".to_string(), JsonValue::from(point.display_name()));
        properties.insert("category".to_string(), JsonValue::from(point.category.as_str()));
        if point.category == Category::Park {
            let fill = demand_color(point.demand_liters);
            let fill = if style.desaturated { fill.desaturate(0.6) } else { fill };
            properties.insert("demand_liters".to_string(), JsonValue::from(point.demand_liters));
            properties.insert("fill".to_string(), JsonValue::from(fill.to_hex()));
        }
        properties.insert("opacity".to_string(), JsonValue::from(style.opacity));
        features.push(feature(&shape, properties));
        rendered_shapes.push(shape);
    }

    for route in &result.routes {
        let Some(style) = visibility.segment(route.vehicle_id).point_style() else {
            continue;
        };
        for (i, stop) in route.stops().iter().enumerate() {
            let Some(point) = registry.get(&stop.base_id) else {
                continue;
            };
            let Some(load) = route.load_before(i) else {
                continue;
            };
            if point.category != Category::Refill {
                continue;
            }

            let level = urgency(load, vehicle_capacity_l);
            let color = urgency_ramp(level);
            let color = if style.desaturated { color.desaturate(0.6) } else { color };
            let mut properties = Map::new();
            properties.insert("kind".to_string(), JsonValue::from("urgency"));
            properties.insert("vehicle_id".to_string(), JsonValue::from(route.vehicle_id.0));
            properties.insert("point_id".to_string(), JsonValue::from(point.id.as_str()));
            properties.insert("stop_index".to_string(), JsonValue::from(i));
            properties.insert("load_before_l".to_string(), JsonValue::from(load));
            properties.insert("urgency".to_string(), JsonValue::from(level));
            properties.insert("color".to_string(), JsonValue::from(color.to_hex()));
            properties.insert("label".to_string(), JsonValue::from(urgency_label(level)));
            properties.insert("opacity".to_string(), JsonValue::from(style.opacity));
            features.push(feature(&Shape::point(point.coordinate), properties));
        }
    }

    let foreign_members = visibility.show_legend().then(|| {
        let mut members = Map::new();
        members.insert("legend".to_string(), legend(result));
        members
    });

    FeatureCollection {
        features,
        bbox: shape_bounds(&rendered_shapes).map(|b| b.to_bbox()),
        foreign_members,
    }
}

fn feature(shape: &Shape, properties: Map<String, JsonValue>) -> Feature {
    Feature {
        geometry: Some(shape.to_geojson_geometry()),
        properties: Some(properties),
        id: None,
        bbox: None,
        foreign_members: None,
    }
}

fn legend(result: &OptimizeResponse) -> JsonValue {
    let demand: Vec<JsonValue> = DemandTier::all()
        .iter()
        .map(|tier| json!({ "label": tier.label(), "color": tier.color().to_hex() }))
        .collect();
    let vehicles: Vec<JsonValue> = result
        .routes
        .iter()
        .enumerate()
        .take(ROUTE_PALETTE.len())
        .map(|(i, r)| json!({ "vehicle_id": r.vehicle_id.0, "color": route_color(i).to_hex() }))
        .collect();
    json!({ "demand": demand, "vehicles": vehicles })
}
