//! Focus and highlight state for points and route paths.

use crate::models::{PointId, Route, VehicleId};
use std::collections::{BTreeMap, BTreeSet};

/// Which vehicle is in focus, and whether out-of-focus entities are omitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighlightSelector {
    pub vehicle: Option<VehicleId>,
    pub isolate: bool,
}

impl HighlightSelector {
    /// Nothing highlighted
    pub fn none() -> Self {
        Self::default()
    }

    pub fn vehicle(vehicle: VehicleId) -> Self {
        Self { vehicle: Some(vehicle), isolate: false }
    }

    pub fn with_isolate(mut self, isolate: bool) -> Self {
        self.isolate = isolate;
        self
    }
}

/// Base point ids visited by each vehicle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMembership {
    by_vehicle: BTreeMap<VehicleId, BTreeSet<PointId>>,
}

impl RouteMembership {
    pub fn from_routes(routes: &[Route]) -> Self {
        let mut membership = Self::default();
        for route in routes {
            membership.insert(route.vehicle_id, route.base_ids());
        }
        membership
    }

    pub fn insert(&mut self, vehicle: VehicleId, ids: impl IntoIterator<Item = PointId>) {
        self.by_vehicle.entry(vehicle).or_default().extend(ids);
    }

    pub fn members(&self, vehicle: VehicleId) -> Option<&BTreeSet<PointId>> {
        self.by_vehicle.get(&vehicle)
    }

    pub fn contains(&self, vehicle: VehicleId, id: &PointId) -> bool {
        self.by_vehicle.get(&vehicle).is_some_and(|ids| ids.contains(id))
    }

    pub fn vehicles(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.by_vehicle.keys().copied()
    }

    /// Every point visited by any vehicle
    pub fn involved_points(&self) -> BTreeSet<PointId> {
        self.by_vehicle.values().flatten().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Dimmed,
    Hidden,
}

impl Visibility {
    pub fn is_rendered(&self) -> bool {
        !matches!(self, Visibility::Hidden)
    }

    pub fn segment_style(&self) -> Option<SegmentStyle> {
        match self {
            Visibility::Visible => Some(SegmentStyle { weight: 5.0, opacity: 0.8 }),
            Visibility::Dimmed => Some(SegmentStyle { weight: 2.0, opacity: 0.1 }),
            Visibility::Hidden => None,
        }
    }

    pub fn point_style(&self) -> Option<PointStyle> {
        match self {
            Visibility::Visible => Some(PointStyle { opacity: 1.0, desaturated: false }),
            Visibility::Dimmed => Some(PointStyle { opacity: 0.35, desaturated: true }),
            Visibility::Hidden => None,
        }
    }
}

/// Stroke parameters for a route path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentStyle {
    pub weight: f64,
    pub opacity: f64,
}

/// Marker parameters for a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    pub opacity: f64,
    pub desaturated: bool,
}

/// Visibility of every point and path under one selector
#[derive(Debug, Clone, Copy)]
pub struct VisibilityDecision<'a> {
    selector: HighlightSelector,
    membership: &'a RouteMembership,
}

impl<'a> VisibilityDecision<'a> {
    fn out_of_focus(&self) -> Visibility {
        if self.selector.isolate {
            Visibility::Hidden
        } else {
            Visibility::Dimmed
        }
    }

    pub fn selector(&self) -> HighlightSelector {
        self.selector
    }

    pub fn point(&self, id: &PointId) -> Visibility {
        match self.selector.vehicle {
            None => Visibility::Visible,
            Some(v) if self.membership.contains(v, id) => Visibility::Visible,
            Some(_) => self.out_of_focus(),
        }
    }

    /// Visibility of a vehicle's path segments
    pub fn segment(&self, vehicle: VehicleId) -> Visibility {
        match self.selector.vehicle {
            None => Visibility::Visible,
            Some(v) if v == vehicle => Visibility::Visible,
            Some(_) => self.out_of_focus(),
        }
    }

    /// Decorative overlays such as the legend
    pub fn show_legend(&self) -> bool {
        !self.selector.isolate
    }

    /// Involved points that are drawn at all, with their visibility
    pub fn rendered_points(&self) -> Vec<(PointId, Visibility)> {
        self.membership
            .involved_points()
            .into_iter()
            .map(|id| {
                let visibility = self.point(&id);
                (id, visibility)
            })
            .filter(|(_, v)| v.is_rendered())
            .collect()
    }
}

/// Derive the visibility decision for a selector
pub fn compute_visibility(
    selector: HighlightSelector,
    membership: &RouteMembership,
) -> VisibilityDecision<'_> {
    VisibilityDecision { selector, membership }
}
