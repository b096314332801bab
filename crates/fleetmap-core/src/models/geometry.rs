//! Canonical geometry types used across all fleetmap crates.
//!
//! Shapes serialize as GeoJSON geometry objects (longitude-latitude order)
//! and convert into `geo` crate types for computation.

use crate::error::{FleetmapError, Result};
use serde::{Deserialize, Serialize};

/// A geographic position in floating degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// GeoJSON position (`[lon, lat]`)
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Build from a GeoJSON position (`[lon, lat]`)
    pub fn from_lon_lat(position: [f64; 2]) -> Self {
        Self { lat: position[1], lon: position[0] }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    pub fn to_geo_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

/// Shape classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeType {
    Point,
    LineString,
    Polygon,
    MultiLineString,
    MultiPolygon,
}

/// GeoJSON-compatible shape
///
/// Either the degenerate single-point shape of a coordinate, or a line/area
/// used for geometry overrides and road paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiLineString { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

impl Shape {
    /// Single-point shape at a coordinate
    pub fn point(coordinate: Coordinate) -> Self {
        Shape::Point { coordinates: coordinate.to_lon_lat() }
    }

    pub fn line_string(coords: Vec<[f64; 2]>) -> Self {
        Shape::LineString { coordinates: coords }
    }

    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Shape::Polygon { coordinates: rings }
    }

    /// Two-point straight line `[from, to]`
    pub fn straight_line(from: Coordinate, to: Coordinate) -> Self {
        Shape::LineString { coordinates: vec![from.to_lon_lat(), to.to_lon_lat()] }
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Point { .. } => ShapeType::Point,
            Shape::LineString { .. } => ShapeType::LineString,
            Shape::Polygon { .. } => ShapeType::Polygon,
            Shape::MultiLineString { .. } => ShapeType::MultiLineString,
            Shape::MultiPolygon { .. } => ShapeType::MultiPolygon,
        }
    }

    /// Whether the shape degenerates to a single coordinate
    pub fn is_point(&self) -> bool {
        matches!(self, Shape::Point { .. })
    }

    /// The coordinate of a single-point shape
    pub fn as_coordinate(&self) -> Option<Coordinate> {
        match self {
            Shape::Point { coordinates } => Some(Coordinate::from_lon_lat(*coordinates)),
            _ => None,
        }
    }

    /// Number of positions across all parts
    pub fn position_count(&self) -> usize {
        match self {
            Shape::Point { .. } => 1,
            Shape::LineString { coordinates } => coordinates.len(),
            Shape::Polygon { coordinates } | Shape::MultiLineString { coordinates } => {
                coordinates.iter().map(Vec::len).sum()
            }
            Shape::MultiPolygon { coordinates } => {
                coordinates.iter().flat_map(|p| p.iter()).map(Vec::len).sum()
            }
        }
    }

    /// Check that the shape is drawable
    pub fn validate(&self, context: &str) -> Result<()> {
        let invalid = |reason: String| FleetmapError::InvalidGeometry {
            context: context.to_string(),
            reason,
        };

        match self {
            Shape::Point { coordinates } => check_finite(std::slice::from_ref(coordinates)),
            Shape::LineString { coordinates } => check_line(coordinates),
            Shape::Polygon { coordinates } => check_polygon(coordinates),
            Shape::MultiLineString { coordinates } => {
                if coordinates.is_empty() {
                    return Err(invalid("MultiLineString has no parts".to_string()));
                }
                coordinates.iter().try_for_each(|line| check_line(line))
            }
            Shape::MultiPolygon { coordinates } => {
                if coordinates.is_empty() {
                    return Err(invalid("MultiPolygon has no parts".to_string()));
                }
                coordinates.iter().try_for_each(|poly| check_polygon(poly))
            }
        }
        .map_err(invalid)
    }

    /// Try to parse from a GeoJSON geometry value
    pub fn from_geojson(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Convert to a GeoJSON geometry value
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Convert to a `geojson` crate geometry
    pub fn to_geojson_geometry(&self) -> geojson::Geometry {
        let value = match self {
            Shape::Point { coordinates } => geojson::Value::Point(coordinates.to_vec()),
            Shape::LineString { coordinates } => geojson::Value::LineString(positions(coordinates)),
            Shape::Polygon { coordinates } => {
                geojson::Value::Polygon(coordinates.iter().map(|r| positions(r)).collect())
            }
            Shape::MultiLineString { coordinates } => geojson::Value::MultiLineString(
                coordinates.iter().map(|l| positions(l)).collect(),
            ),
            Shape::MultiPolygon { coordinates } => geojson::Value::MultiPolygon(
                coordinates
                    .iter()
                    .map(|poly| poly.iter().map(|r| positions(r)).collect())
                    .collect(),
            ),
        };
        geojson::Geometry::new(value)
    }

    /// Convert to a `geo` crate geometry
    pub fn to_geo_geometry(&self) -> geo::Geometry<f64> {
        match self {
            Shape::Point { coordinates } => {
                geo::Geometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
            }
            Shape::LineString { coordinates } => {
                geo::Geometry::LineString(geo::LineString::from(coordinates.clone()))
            }
            Shape::Polygon { coordinates } => geo::Geometry::Polygon(to_geo_polygon(coordinates)),
            Shape::MultiLineString { coordinates } => {
                geo::Geometry::MultiLineString(geo::MultiLineString::new(
                    coordinates.iter().map(|l| geo::LineString::from(l.clone())).collect(),
                ))
            }
            Shape::MultiPolygon { coordinates } => geo::Geometry::MultiPolygon(
                geo::MultiPolygon::new(coordinates.iter().map(|p| to_geo_polygon(p)).collect()),
            ),
        }
    }
}

fn positions(coords: &[[f64; 2]]) -> Vec<Vec<f64>> {
    coords.iter().map(|c| c.to_vec()).collect()
}

fn to_geo_polygon(rings: &[Vec<[f64; 2]>]) -> geo::Polygon<f64> {
    let mut rings = rings.iter().map(|r| geo::LineString::from(r.clone()));
    let exterior = rings.next().unwrap_or_else(|| geo::LineString::new(Vec::new()));
    geo::Polygon::new(exterior, rings.collect())
}

fn check_finite(coords: &[[f64; 2]]) -> std::result::Result<(), String> {
    match coords.iter().position(|c| !c[0].is_finite() || !c[1].is_finite()) {
        Some(i) => Err(format!("coordinate {} is not finite", i)),
        None => Ok(()),
    }
}

fn check_line(coords: &[[f64; 2]]) -> std::result::Result<(), String> {
    if coords.len() < 2 {
        return Err(format!("LineString must have at least 2 points, found {}", coords.len()));
    }
    check_finite(coords)
}

fn check_polygon(rings: &[Vec<[f64; 2]>]) -> std::result::Result<(), String> {
    if rings.is_empty() {
        return Err("Polygon has no rings".to_string());
    }
    for ring in rings {
        if ring.len() < 4 {
            return Err(format!("Polygon ring must have at least 4 points, found {}", ring.len()));
        }
        if ring.first() != ring.last() {
            return Err("Polygon ring is not closed".to_string());
        }
        check_finite(ring)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_serialization_is_geojson() {
        let shape = Shape::point(Coordinate::new(-7.2642, 112.7532));
        let json = serde_json::to_value(&shape).unwrap();

        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"][0], 112.7532);
        assert_eq!(json["coordinates"][1], -7.2642);

        let parsed = Shape::from_geojson(&json).unwrap();
        assert_eq!(parsed, shape);
    }

    #[test]
    fn test_straight_line_is_lon_lat_pair() {
        let a = Coordinate::new(-7.26, 112.75);
        let b = Coordinate::new(-7.31, 112.79);
        let line = Shape::straight_line(a, b);

        assert_eq!(line, Shape::line_string(vec![[112.75, -7.26], [112.79, -7.31]]));
        assert_eq!(line.position_count(), 2);
    }

    #[test]
    fn test_validate_rejects_short_line() {
        let line = Shape::line_string(vec![[112.75, -7.26]]);
        let err = line.validate("drawn shape").unwrap_err();
        assert!(err.to_string().contains("at least 2 points"));
    }

    #[test]
    fn test_validate_rejects_open_ring() {
        let open = Shape::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]);
        assert!(open.validate("park").is_err());

        let closed =
            Shape::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]);
        assert!(closed.validate("park").is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let line = Shape::line_string(vec![[0.0, 0.0], [f64::NAN, 1.0]]);
        assert!(line.validate("road").is_err());
    }

    #[test]
    fn test_geojson_conversion() {
        let line = Shape::line_string(vec![[112.76, -7.25], [112.77, -7.26]]);
        let geometry = line.to_geojson_geometry();
        match geometry.value {
            geojson::Value::LineString(coords) => {
                assert_eq!(coords, vec![vec![112.76, -7.25], vec![112.77, -7.26]]);
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_as_coordinate() {
        let c = Coordinate::new(-7.3, 112.8);
        assert_eq!(Shape::point(c).as_coordinate(), Some(c));
        assert_eq!(Shape::straight_line(c, c).as_coordinate(), None);
    }
}
