use crate::error::Result;
use crate::models::point::{Point, PointId};
use crate::models::route::OptimizeRequest;
use std::collections::BTreeSet;

/// Operator-chosen candidate points for an optimization run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<PointId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the id if absent, remove it if present. Returns the new membership.
    pub fn toggle(&mut self, id: &PointId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn select_all<'a>(&mut self, points: impl IntoIterator<Item = &'a Point>) {
        self.ids.extend(points.into_iter().map(|p| p.id.clone()));
    }

    /// Replace the selection with a saved group's members
    pub fn apply_group(&mut self, ids: impl IntoIterator<Item = PointId>) {
        self.ids = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &PointId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointId> {
        self.ids.iter()
    }

    /// Build the optimization payload; ids are emitted sorted
    pub fn to_request(&self, vehicle_count: u32) -> Result<OptimizeRequest> {
        OptimizeRequest::new(vehicle_count, self.ids.iter().cloned().collect())
    }
}
