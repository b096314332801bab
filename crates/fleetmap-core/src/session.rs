//! Route session: the state a map view works against.
//!
//! Results and registry snapshots are replaced wholesale. Geometry
//! resolution runs detached from the session and is only accepted back if no
//! newer optimization run, drawing or save happened in the meantime.

use crate::binding::BindingWorkflow;
use crate::error::Result;
use crate::export::render_feature_collection;
use crate::focus::{compute_visibility, HighlightSelector, RouteMembership, VisibilityDecision};
use crate::models::{Coordinate, OptimizeRequest, OptimizeResponse, PointId, SelectionSet, Shape};
use crate::ports::{CatalogService, Optimizer, RoadRouter};
use crate::registry::PointRegistry;
use crate::resolve::{ResolvedGeometry, RouteGeometryResolver};
use geojson::FeatureCollection;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic run counter shared with outstanding jobs
#[derive(Debug, Clone, Default)]
pub struct RunEpoch(Arc<AtomicU64>);

impl RunEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> RunToken {
        RunToken { value: self.0.load(Ordering::Acquire), epoch: self.0.clone() }
    }

    /// Invalidate every token handed out so far
    pub fn advance(&self) -> RunToken {
        let value = self.0.fetch_add(1, Ordering::AcqRel) + 1;
        RunToken { value, epoch: self.0.clone() }
    }
}

/// Snapshot of the epoch at the time work was started
#[derive(Debug, Clone)]
pub struct RunToken {
    value: u64,
    epoch: Arc<AtomicU64>,
}

impl RunToken {
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn is_current(&self) -> bool {
        self.epoch.load(Ordering::Acquire) == self.value
    }
}

/// Inputs for one geometry resolution, detached from the session
#[derive(Debug, Clone)]
pub struct ResolutionJob {
    token: RunToken,
    result: Arc<OptimizeResponse>,
    registry: PointRegistry,
}

impl ResolutionJob {
    pub fn token(&self) -> &RunToken {
        &self.token
    }

    pub async fn run<R: RoadRouter>(self, resolver: &RouteGeometryResolver<R>) -> ResolutionOutcome {
        let geometry = resolver.resolve(&self.result.routes, &self.registry).await;
        ResolutionOutcome { token: self.token, geometry }
    }
}

#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub token: RunToken,
    pub geometry: ResolvedGeometry,
}

#[derive(Debug, Default)]
pub struct RouteSession {
    registry: PointRegistry,
    selection: SelectionSet,
    result: Option<Arc<OptimizeResponse>>,
    membership: RouteMembership,
    geometry: Option<ResolvedGeometry>,
    selector: HighlightSelector,
    binding: BindingWorkflow,
    epoch: RunEpoch,
}

impl RouteSession {
    pub fn new(registry: PointRegistry) -> Self {
        Self { registry, ..Default::default() }
    }

    /// Load the registry from the catalog
    pub async fn load<C: CatalogService + ?Sized>(catalog: &C) -> Result<Self> {
        let records = catalog.list_points().await?;
        let registry = PointRegistry::load(&records);
        tracing::info!(points = registry.len(), records = records.len(), "Loaded point catalog");
        Ok(Self::new(registry))
    }

    pub fn registry(&self) -> &PointRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    pub fn result(&self) -> Option<&OptimizeResponse> {
        self.result.as_deref()
    }

    /// Geometry for the current result, if it has been resolved
    pub fn geometry(&self) -> Option<&ResolvedGeometry> {
        self.geometry.as_ref()
    }

    pub fn membership(&self) -> &RouteMembership {
        &self.membership
    }

    pub fn selector(&self) -> HighlightSelector {
        self.selector
    }

    pub fn set_selector(&mut self, selector: HighlightSelector) {
        self.selector = selector;
    }

    pub fn binding(&self) -> &BindingWorkflow {
        &self.binding
    }

    pub fn current_token(&self) -> RunToken {
        self.epoch.current()
    }

    /// Run an optimization for the current selection
    pub async fn optimize_selection<O: Optimizer + ?Sized>(
        &mut self,
        optimizer: &O,
        vehicle_count: u32,
    ) -> Result<&OptimizeResponse> {
        let request = self.selection.to_request(vehicle_count)?;
        self.optimize(optimizer, &request).await
    }

    /// Run an optimization and replace the current result
    ///
    /// On failure the previous result and geometry are kept.
    pub async fn optimize<O: Optimizer + ?Sized>(
        &mut self,
        optimizer: &O,
        request: &OptimizeRequest,
    ) -> Result<&OptimizeResponse> {
        let response = optimizer.optimize(request).await.and_then(|r| r.validate().map(|_| r));
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Optimization failed, keeping previous result");
                return Err(e);
            }
        };

        tracing::info!(
            vehicles = response.vehicles_used,
            stops = response.total_stops(),
            objective_min = response.objective_time_min,
            "Optimization result received"
        );

        Ok(self.load_result(response))
    }

    /// Replace the current result wholesale
    ///
    /// Outstanding resolutions are invalidated. A highlighted vehicle that is
    /// absent from the new result is cleared.
    pub fn load_result(&mut self, response: OptimizeResponse) -> &OptimizeResponse {
        self.epoch.advance();
        self.membership = RouteMembership::from_routes(&response.routes);
        self.geometry = None;
        if self.selector.vehicle.is_some_and(|v| response.route(v).is_none()) {
            self.selector.vehicle = None;
        }
        self.result.insert(Arc::new(response))
    }

    /// Snapshot what a geometry resolution needs; `None` without a result
    pub fn resolution_job(&self) -> Option<ResolutionJob> {
        let result = self.result.clone()?;
        Some(ResolutionJob { token: self.epoch.current(), result, registry: self.registry.clone() })
    }

    /// Apply a finished resolution unless it was overtaken
    pub fn accept_resolution(&mut self, outcome: ResolutionOutcome) -> bool {
        if !outcome.token.is_current() {
            tracing::debug!(token = outcome.token.value(), "Discarding stale route geometry");
            return false;
        }
        self.geometry = Some(outcome.geometry);
        true
    }

    /// Resolve geometry in place
    pub async fn resolve<R: RoadRouter>(&mut self, resolver: &RouteGeometryResolver<R>) -> bool {
        match self.resolution_job() {
            Some(job) => {
                let outcome = job.run(resolver).await;
                self.accept_resolution(outcome)
            }
            None => false,
        }
    }

    pub fn visibility(&self) -> VisibilityDecision<'_> {
        compute_visibility(self.selector, &self.membership)
    }

    /// Render scene for the current result; `None` until geometry is resolved
    pub fn render(&self, vehicle_capacity_l: f64) -> Option<FeatureCollection> {
        let result = self.result.as_deref()?;
        let geometry = self.geometry.as_ref()?;
        Some(render_feature_collection(
            result,
            geometry,
            &self.registry,
            &self.visibility(),
            vehicle_capacity_l,
        ))
    }

    pub fn start_drawing(&mut self) -> Result<()> {
        self.binding.start_drawing()?;
        self.epoch.advance();
        Ok(())
    }

    pub fn finalize_drawing(&mut self, shape: Shape, click: Coordinate) -> Result<Option<PointId>> {
        self.binding.finalize(shape, click, &self.registry)
    }

    pub fn cancel_drawing(&mut self) -> Result<()> {
        self.binding.cancel()
    }

    /// Persist the proposed binding
    ///
    /// A successful change invalidates cached geometry so the next
    /// resolution picks up the new override.
    pub async fn save_binding<C: CatalogService + ?Sized>(&mut self, catalog: &C) -> Result<bool> {
        let changed = self.binding.save(catalog, &mut self.registry).await?;
        if changed {
            self.epoch.advance();
            self.geometry = None;
        }
        Ok(changed)
    }
}
