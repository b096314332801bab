//! Point registry: ingestion of raw catalog records and effective geometry.
//!
//! Backend records use several spellings for the same field. They are
//! resolved once here through [`POINT_FIELD_ALIASES`]; the rest of the crate
//! only sees [`Point`].

use crate::error::{FleetmapError, Result};
use crate::models::{Category, Coordinate, Point, PointId, Shape};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Canonical point fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointField {
    Id,
    Name,
    Lat,
    Lon,
    Category,
    Demand,
    Geometry,
}

/// Backend aliases per canonical field, checked in order
pub const POINT_FIELD_ALIASES: &[(PointField, &[&str])] = &[
    (PointField::Id, &["id", "node_id", "point_id"]),
    (PointField::Name, &["name", "label", "title"]),
    (PointField::Lat, &["lat", "latitude"]),
    (PointField::Lon, &["lon", "lng", "longitude"]),
    (PointField::Category, &["kind", "type", "category"]),
    (PointField::Demand, &["demand_liters", "demand", "demand_l"]),
    (PointField::Geometry, &["geometry", "geom"]),
];

fn aliases(field: PointField) -> &'static [&'static str] {
    POINT_FIELD_ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

/// First non-null value among a field's aliases
fn lookup(record: &Map<String, Value>, field: PointField) -> Option<&Value> {
    aliases(field).iter().filter_map(|name| record.get(*name)).find(|v| !v.is_null())
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => match n.as_f64() {
            // integral floats name the same point as their integer form
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Some((f as i64).to_string())
            }
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Normalize one raw record, or explain why it was skipped
pub fn normalize_record(value: &Value) -> std::result::Result<Point, String> {
    let record = value.as_object().ok_or_else(|| "record is not an object".to_string())?;

    let id = lookup(record, PointField::Id)
        .and_then(coerce_string)
        .ok_or_else(|| "missing id".to_string())?;

    let shape = lookup(record, PointField::Geometry).and_then(Shape::from_geojson);

    let lat = lookup(record, PointField::Lat).and_then(coerce_f64);
    let lon = lookup(record, PointField::Lon).and_then(coerce_f64);
    let coordinate = match (lat, lon, shape.as_ref().and_then(Shape::as_coordinate)) {
        (Some(lat), Some(lon), _) => Coordinate::new(lat, lon),
        (_, _, Some(c)) if c.is_finite() => c,
        _ => return Err(format!("point {} has no usable coordinate", id)),
    };

    let category = match lookup(record, PointField::Category) {
        Some(Value::String(s)) => Category::parse(s).unwrap_or_else(|| {
            tracing::debug!(point_id = %id, category = %s, "Unknown category, using park");
            Category::Park
        }),
        _ => Category::default(),
    };

    let demand_liters =
        lookup(record, PointField::Demand).and_then(coerce_f64).unwrap_or(0.0).max(0.0);

    let name = lookup(record, PointField::Name).and_then(coerce_string);

    let geometry_override = shape.filter(|s| !s.is_point()).filter(|s| {
        let valid = s.validate(&id).is_ok();
        if !valid {
            tracing::warn!(point_id = %id, "Ignoring invalid geometry override");
        }
        valid
    });

    Ok(Point {
        id: PointId::new(id),
        name,
        coordinate,
        category,
        demand_liters,
        geometry_override,
    })
}

/// Normalize raw catalog records, skipping malformed entries
pub fn load_points(records: &[Value]) -> Vec<Point> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| match normalize_record(record) {
            Ok(point) => Some(point),
            Err(reason) => {
                tracing::warn!(record = i, reason = %reason, "Skipping malformed point record");
                None
            }
        })
        .collect()
}

/// In-memory point set
///
/// Cloning is cheap and yields a snapshot: mutations through
/// [`PointRegistry::apply_override`] copy the underlying storage when it is
/// shared, so earlier clones keep seeing the old geometry.
#[derive(Debug, Clone, Default)]
pub struct PointRegistry {
    points: Arc<Vec<Point>>,
    index: Arc<HashMap<PointId, usize>>,
}

impl PointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw catalog records
    pub fn load(records: &[Value]) -> Self {
        Self::from_points(load_points(records))
    }

    /// Build from canonical points. The first occurrence of an id wins.
    pub fn from_points(points: Vec<Point>) -> Self {
        let mut kept = Vec::with_capacity(points.len());
        let mut index = HashMap::with_capacity(points.len());

        for point in points {
            if index.contains_key(&point.id) {
                tracing::warn!(point_id = %point.id, "Duplicate point id, keeping first");
                continue;
            }
            index.insert(point.id.clone(), kept.len());
            kept.push(point);
        }

        Self { points: Arc::new(kept), index: Arc::new(index) }
    }

    pub fn get(&self, id: &PointId) -> Option<&Point> {
        self.index.get(id).map(|&i| &self.points[i])
    }

    pub fn contains(&self, id: &PointId) -> bool {
        self.index.contains_key(id)
    }

    /// Effective geometry of a point, if it exists
    pub fn effective_geometry(&self, id: &PointId) -> Option<Shape> {
        self.get(id).map(Point::effective_geometry)
    }

    /// Merge a newly persisted geometry into the registry
    ///
    /// A single-point shape moves the point's coordinate and clears any
    /// override. Returns whether anything changed; re-applying the same
    /// shape returns `false`.
    pub fn apply_override(&mut self, id: &PointId, shape: Shape) -> Result<bool> {
        let i = *self
            .index
            .get(id)
            .ok_or_else(|| FleetmapError::PointNotFound { id: id.to_string() })?;

        let current = &self.points[i];
        let unchanged = match shape.as_coordinate() {
            Some(c) => current.geometry_override.is_none() && current.coordinate == c,
            None => current.geometry_override.as_ref() == Some(&shape),
        };
        if unchanged {
            return Ok(false);
        }

        let point = &mut Arc::make_mut(&mut self.points)[i];
        match shape.as_coordinate() {
            Some(c) => {
                point.coordinate = c;
                point.geometry_override = None;
            }
            None => point.geometry_override = Some(shape),
        }

        tracing::info!(point_id = %id, "Applied geometry override");
        Ok(true)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
