use crate::models::{Route, Shape, StopRef};
use crate::registry::PointRegistry;
use geo::{BoundingRect, Geometry as GeoGeometry, GeometryCollection};
use serde::{Deserialize, Serialize};

/// Axis-aligned view bounds in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub fn center(&self) -> (f64, f64) {
        ((self.min_lat + self.max_lat) / 2.0, (self.min_lon + self.max_lon) / 2.0)
    }

    /// GeoJSON bbox order: `[west, south, east, north]`
    pub fn to_bbox(&self) -> Vec<f64> {
        vec![self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

fn bounds_of(geometries: Vec<GeoGeometry<f64>>) -> Option<Bounds> {
    let rect = GeometryCollection(geometries).bounding_rect()?;
    Some(Bounds {
        min_lat: rect.min().y,
        min_lon: rect.min().x,
        max_lat: rect.max().y,
        max_lon: rect.max().x,
    })
}

/// Bounds of a set of shapes
pub fn shape_bounds<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Option<Bounds> {
    bounds_of(shapes.into_iter().map(Shape::to_geo_geometry).collect())
}

/// Bounds covering the effective geometry of every point visited by `routes`
pub fn involved_bounds(routes: &[Route], registry: &PointRegistry) -> Option<Bounds> {
    let geometries = routes
        .iter()
        .flat_map(|r| r.sequence.iter())
        .filter_map(|raw| registry.get(&StopRef::parse(raw).base_id))
        .map(|p| p.effective_geometry().to_geo_geometry())
        .collect();
    bounds_of(geometries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Coordinate, Point, VehicleId};

    #[test]
    fn test_involved_bounds() {
        let registry = PointRegistry::from_points(vec![
            Point::new("0", Coordinate::new(-7.26, 112.75), Category::Depot),
            Point::new("1", Coordinate::new(-7.31, 112.79), Category::Park),
            Point::new("2", Coordinate::new(-8.0, 110.0), Category::Park),
        ]);
        let routes = vec![Route {
            vehicle_id: VehicleId(0),
            sequence: vec!["0".into(), "1#1".into(), "0".into()],
            total_time_min: 30.0,
            load_profile_liters: vec![5000.0, 4000.0, 4000.0],
        }];

        let b = involved_bounds(&routes, &registry).unwrap();
        assert_eq!(b.min_lat, -7.31);
        assert_eq!(b.max_lat, -7.26);
        assert_eq!(b.min_lon, 112.75);
        assert_eq!(b.max_lon, 112.79);
        assert_eq!(b.to_bbox(), vec![112.75, -7.31, 112.79, -7.26]);
    }

    #[test]
    fn test_empty_routes_have_no_bounds() {
        assert!(involved_bounds(&[], &PointRegistry::new()).is_none());
    }
}
