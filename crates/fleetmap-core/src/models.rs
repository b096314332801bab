pub mod geometry;
pub mod point;
pub mod route;
pub mod selection;

pub use geometry::{Coordinate, Shape, ShapeType};
pub use point::{Category, Point, PointId};
pub use route::{OptimizeRequest, OptimizeResponse, Route, StopRef, VehicleId, REVISIT_SEPARATOR};
pub use selection::SelectionSet;
