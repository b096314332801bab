//! Geo module for spatial operations
//!
//! Great-circle distance, nearest-point matching and view bounds.

pub mod bounds;
pub mod spatial;

pub use bounds::{involved_bounds, shape_bounds, Bounds};
pub use spatial::{
    find_nearest_point, find_nearest_with_distance, haversine_distance, DEFAULT_MATCH_TOLERANCE_M,
};
