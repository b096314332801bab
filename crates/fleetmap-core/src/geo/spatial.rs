use crate::models::{Coordinate, Point};
use geo::{Distance, Haversine};

/// Maximum distance between a click and the point it may bind to
pub const DEFAULT_MATCH_TOLERANCE_M: f64 = 150.0;

/// Great-circle distance between two coordinates in meters
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    Haversine.distance(a.to_geo_point(), b.to_geo_point())
}

/// Nearest eligible point strictly within `tolerance_m` of `click`
///
/// Only points whose effective geometry is a single coordinate are
/// candidates. On exact distance ties the first candidate in input order
/// wins. Beyond the tolerance there is no match at all.
pub fn find_nearest_point<'a, I>(click: Coordinate, candidates: I, tolerance_m: f64) -> Option<&'a Point>
where
    I: IntoIterator<Item = &'a Point>,
{
    find_nearest_with_distance(click, candidates, tolerance_m).map(|(point, _)| point)
}

/// Like [`find_nearest_point`], also returning the distance in meters
pub fn find_nearest_with_distance<'a, I>(
    click: Coordinate,
    candidates: I,
    tolerance_m: f64,
) -> Option<(&'a Point, f64)>
where
    I: IntoIterator<Item = &'a Point>,
{
    if !click.is_finite() {
        return None;
    }

    let mut best: Option<(&'a Point, f64)> = None;
    for point in candidates.into_iter().filter(|p| p.is_point_like()) {
        let d = haversine_distance(click, point.coordinate);
        // NaN never compares less, so broken coordinates drop out here
        let closer = match best {
            Some((_, best_d)) => d < best_d,
            None => d < tolerance_m,
        };
        if closer {
            best = Some((point, d));
        }
    }
    best
}
