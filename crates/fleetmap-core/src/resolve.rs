//! Route geometry resolution
//!
//! Expands each vehicle's visit sequence into drawable shapes: connecting
//! legs between consecutive stops, followed by each stop's own line or area
//! shape. Legs touching a depot or refill are looked up on the road network;
//! legs between two parks are not drawn. Lookups for different legs run
//! concurrently and are written back into the slot of the leg they belong
//! to, so output order never depends on completion order.

use crate::models::{Category, Coordinate, Point, Route, Shape, StopRef, VehicleId};
use crate::ports::RoadRouter;
use crate::registry::PointRegistry;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Default bounded wait for a single road lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);

/// Default number of road lookups in flight at once
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Drawable shapes per vehicle, in route order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedGeometry {
    by_vehicle: BTreeMap<VehicleId, Vec<Shape>>,
}

impl ResolvedGeometry {
    pub fn get(&self, vehicle: VehicleId) -> Option<&[Shape]> {
        self.by_vehicle.get(&vehicle).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VehicleId, &[Shape])> {
        self.by_vehicle.iter().map(|(v, shapes)| (*v, shapes.as_slice()))
    }

    pub fn vehicle_count(&self) -> usize {
        self.by_vehicle.len()
    }

    pub fn shape_count(&self) -> usize {
        self.by_vehicle.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_vehicle.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<VehicleId, Vec<Shape>> {
        self.by_vehicle
    }
}

/// One output position of a vehicle's plan
#[derive(Debug)]
enum Slot {
    Leg { from: Coordinate, to: Coordinate },
    Ready(Shape),
}

/// Whether two consecutive stops are joined by a drawn leg
fn needs_leg(prev: &Point, next: &Point) -> bool {
    !(prev.category == Category::Park && next.category == Category::Park)
        && prev.coordinate != next.coordinate
}

/// Lay out a route's output slots without consulting the road network
fn plan_route(route: &Route, registry: &PointRegistry) -> Vec<Slot> {
    let mut slots = Vec::new();
    let mut drawn_shapes = HashSet::new();
    let mut prev: Option<&Point> = None;

    for stop in route.sequence.iter().map(|raw| StopRef::parse(raw)) {
        let Some(point) = registry.get(&stop.base_id) else {
            tracing::warn!(
                vehicle = %route.vehicle_id,
                point_id = %stop.base_id,
                "Route references unknown point, skipping stop"
            );
            continue;
        };

        if let Some(prev) = prev {
            if needs_leg(prev, point) {
                slots.push(Slot::Leg { from: prev.coordinate, to: point.coordinate });
            }
        }

        if let Some(shape) = &point.geometry_override {
            if !shape.is_point() && drawn_shapes.insert(point.id.clone()) {
                slots.push(Slot::Ready(shape.clone()));
            }
        }

        prev = Some(point);
    }

    slots
}

/// Resolves routes into per-vehicle geometry using a road router
pub struct RouteGeometryResolver<R> {
    router: R,
    lookup_timeout: Duration,
    max_concurrent: usize,
}

impl<R: RoadRouter> RouteGeometryResolver<R> {
    pub fn new(router: R) -> Self {
        Self {
            router,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            max_concurrent: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    /// Resolve every route against the registry
    ///
    /// Never fails: a leg whose lookup errors, times out or yields no path is
    /// drawn as the straight line between its endpoints.
    pub async fn resolve(&self, routes: &[Route], registry: &PointRegistry) -> ResolvedGeometry {
        let mut plans: Vec<(VehicleId, Vec<Slot>)> =
            routes.iter().map(|r| (r.vehicle_id, plan_route(r, registry))).collect();

        let legs: Vec<(usize, usize, Coordinate, Coordinate)> = plans
            .iter()
            .enumerate()
            .flat_map(|(p, (_, slots))| {
                slots.iter().enumerate().filter_map(move |(s, slot)| match slot {
                    Slot::Leg { from, to } => Some((p, s, *from, *to)),
                    Slot::Ready(_) => None,
                })
            })
            .collect();

        tracing::debug!(routes = routes.len(), legs = legs.len(), "Resolving route geometry");

        let resolved: Vec<(usize, usize, Shape)> = stream::iter(legs)
            .map(|(p, s, from, to)| async move { (p, s, self.lookup_leg(from, to).await) })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        for (p, s, shape) in resolved {
            plans[p].1[s] = Slot::Ready(shape);
        }

        let mut by_vehicle: BTreeMap<VehicleId, Vec<Shape>> = BTreeMap::new();
        for (vehicle, slots) in plans {
            let shapes = by_vehicle.entry(vehicle).or_default();
            for slot in slots {
                match slot {
                    Slot::Ready(shape) => shapes.push(shape),
                    Slot::Leg { from, to } => shapes.push(Shape::straight_line(from, to)),
                }
            }
        }

        ResolvedGeometry { by_vehicle }
    }

    /// Road path for one leg, falling back to a straight line
    async fn lookup_leg(&self, from: Coordinate, to: Coordinate) -> Shape {
        let outcome = tokio::time::timeout(self.lookup_timeout, self.router.route(from, to)).await;

        let reason = match outcome {
            Ok(Ok(Some(shape))) if !shape.is_point() && shape.validate("road path").is_ok() => {
                return shape;
            }
            Ok(Ok(Some(_))) => "unusable path geometry".to_string(),
            Ok(Ok(None)) => "no path returned".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {:?}", self.lookup_timeout),
        };

        tracing::warn!(
            from = ?from.to_lon_lat(),
            to = ?to.to_lon_lat(),
            reason = %reason,
            "Road lookup failed, using straight line"
        );
        Shape::straight_line(from, to)
    }
}
