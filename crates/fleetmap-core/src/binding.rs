//! Geometry binding workflow
//!
//! Drives the draw, propose, confirm and save loop that attaches a drawn
//! line or area to the nearest catalog point.
//!
//! ```text
//! Idle -> Drawing -> Proposed -> Saving -> Idle
//!           |                      |
//!           +-> Idle (no match)    +-> Proposed (write failed)
//! ```

use crate::error::{FleetmapError, Result};
use crate::geo::{find_nearest_point, DEFAULT_MATCH_TOLERANCE_M};
use crate::models::{Coordinate, PointId, Shape};
use crate::ports::CatalogService;
use crate::registry::PointRegistry;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum BindingState {
    #[default]
    Idle,
    Drawing,
    /// A drawn shape waiting for the operator to confirm
    Proposed { point_id: PointId, shape: Shape },
    /// A catalog write is in flight
    Saving { point_id: PointId, shape: Shape },
}

impl BindingState {
    pub fn name(&self) -> &'static str {
        match self {
            BindingState::Idle => "idle",
            BindingState::Drawing => "drawing",
            BindingState::Proposed { .. } => "proposed",
            BindingState::Saving { .. } => "saving",
        }
    }

    /// Point and shape held by a proposal or save
    pub fn pending(&self) -> Option<(&PointId, &Shape)> {
        match self {
            BindingState::Proposed { point_id, shape } | BindingState::Saving { point_id, shape } => {
                Some((point_id, shape))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BindingWorkflow {
    state: BindingState,
    tolerance_m: f64,
    last_error: Option<String>,
}

impl Default for BindingWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingWorkflow {
    pub fn new() -> Self {
        Self { state: BindingState::Idle, tolerance_m: DEFAULT_MATCH_TOLERANCE_M, last_error: None }
    }

    pub fn with_tolerance(mut self, tolerance_m: f64) -> Self {
        self.tolerance_m = tolerance_m;
        self
    }

    pub fn state(&self) -> &BindingState {
        &self.state
    }

    /// Message of the last failed save, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn reject(&self, event: &str) -> FleetmapError {
        FleetmapError::InvalidTransition {
            state: self.state.name().to_string(),
            event: event.to_string(),
        }
    }

    /// Begin a new drawing. A pending proposal is discarded.
    pub fn start_drawing(&mut self) -> Result<()> {
        match self.state {
            BindingState::Idle | BindingState::Proposed { .. } => {
                self.state = BindingState::Drawing;
                Ok(())
            }
            _ => Err(self.reject("start drawing")),
        }
    }

    /// Finish the drawing and look for a point near `click`
    ///
    /// Returns the proposed point, or `None` when nothing is within tolerance
    /// and the workflow went back to idle. Point-like shapes are rejected and
    /// leave the workflow drawing.
    pub fn finalize(
        &mut self,
        shape: Shape,
        click: Coordinate,
        registry: &PointRegistry,
    ) -> Result<Option<PointId>> {
        if self.state != BindingState::Drawing {
            return Err(self.reject("finalize shape"));
        }
        if shape.is_point() {
            return Err(FleetmapError::InvalidGeometry {
                context: "drawn shape".to_string(),
                reason: "expected a line or area".to_string(),
            });
        }
        shape.validate("drawn shape")?;

        match find_nearest_point(click, registry.iter(), self.tolerance_m) {
            Some(point) => {
                tracing::debug!(point_id = %point.id, "Proposing geometry binding");
                let point_id = point.id.clone();
                self.state = BindingState::Proposed { point_id: point_id.clone(), shape };
                Ok(Some(point_id))
            }
            None => {
                tracing::debug!(lat = click.lat, lon = click.lon, "No point within tolerance");
                self.state = BindingState::Idle;
                Ok(None)
            }
        }
    }

    /// Abandon the drawing or proposal
    pub fn cancel(&mut self) -> Result<()> {
        match self.state {
            BindingState::Saving { .. } => Err(self.reject("cancel")),
            _ => {
                self.state = BindingState::Idle;
                Ok(())
            }
        }
    }

    /// Move a proposal into saving, returning what must be written
    pub fn confirm(&mut self) -> Result<(PointId, Shape)> {
        match std::mem::take(&mut self.state) {
            BindingState::Proposed { point_id, shape } => {
                self.state = BindingState::Saving { point_id: point_id.clone(), shape: shape.clone() };
                Ok((point_id, shape))
            }
            other => {
                self.state = other;
                Err(self.reject("confirm"))
            }
        }
    }

    /// Complete a save with the outcome of the catalog write
    ///
    /// On success the override is merged into `registry` and the workflow
    /// goes idle. On failure the proposal is restored so the save can be
    /// retried, and a `CatalogWrite` error is returned. The proposal is also
    /// kept when `registry` does not know the point.
    pub fn finish_save(&mut self, outcome: Result<()>, registry: &mut PointRegistry) -> Result<bool> {
        let (point_id, shape) = match std::mem::take(&mut self.state) {
            BindingState::Saving { point_id, shape } => (point_id, shape),
            other => {
                self.state = other;
                return Err(self.reject("finish save"));
            }
        };

        match outcome {
            Ok(()) => match registry.apply_override(&point_id, shape.clone()) {
                Ok(changed) => {
                    self.last_error = None;
                    Ok(changed)
                }
                Err(e) => {
                    tracing::error!(point_id = %point_id, error = %e, "Saved geometry could not be applied");
                    self.last_error = Some(e.to_string());
                    self.state = BindingState::Proposed { point_id, shape };
                    Err(e)
                }
            },
            Err(e) => {
                let reason = match e {
                    FleetmapError::CatalogWrite { reason, .. } => reason,
                    other => other.to_string(),
                };
                tracing::error!(point_id = %point_id, error = %reason, "Geometry write failed");
                self.last_error = Some(reason.clone());
                self.state = BindingState::Proposed { point_id: point_id.clone(), shape };
                Err(FleetmapError::CatalogWrite { point_id: point_id.to_string(), reason })
            }
        }
    }

    /// Confirm the proposal, write it to the catalog and merge it locally
    pub async fn save<C>(&mut self, catalog: &C, registry: &mut PointRegistry) -> Result<bool>
    where
        C: CatalogService + ?Sized,
    {
        let (point_id, shape) = self.confirm()?;
        let outcome = catalog.write_geometry(&point_id, &shape).await;
        self.finish_save(outcome, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Point};

    fn registry() -> PointRegistry {
        PointRegistry::from_points(vec![
            Point::new("15", Coordinate::new(-7.249943, 112.76848), Category::Park),
            Point::new("16", Coordinate::new(-7.26, 112.78), Category::Park),
        ])
    }

    fn drawn() -> Shape {
        Shape::line_string(vec![[112.7684, -7.2499], [112.7690, -7.2503]])
    }

    #[test]
    fn test_finalize_proposes_nearest() {
        let reg = registry();
        let mut wf = BindingWorkflow::new();
        wf.start_drawing().unwrap();

        let proposed = wf.finalize(drawn(), Coordinate::new(-7.2499, 112.7684), &reg).unwrap();
        assert_eq!(proposed, Some(PointId::new("15")));
        assert_eq!(wf.state().name(), "proposed");
        assert_eq!(wf.state().pending().unwrap().1, &drawn());
    }

    #[test]
    fn test_finalize_without_match_goes_idle() {
        let reg = registry();
        let mut wf = BindingWorkflow::new();
        wf.start_drawing().unwrap();

        let proposed = wf.finalize(drawn(), Coordinate::new(-7.40, 112.60), &reg).unwrap();
        assert_eq!(proposed, None);
        assert_eq!(wf.state(), &BindingState::Idle);
    }

    #[test]
    fn test_finalize_rejects_point_shape() {
        let reg = registry();
        let mut wf = BindingWorkflow::new();
        wf.start_drawing().unwrap();

        let click = Coordinate::new(-7.2499, 112.7684);
        assert!(wf.finalize(Shape::point(click), click, &reg).is_err());
        assert_eq!(wf.state(), &BindingState::Drawing);
    }

    #[test]
    fn test_illegal_transitions() {
        let reg = registry();
        let mut wf = BindingWorkflow::new();

        let err = wf.finalize(drawn(), Coordinate::new(0.0, 0.0), &reg).unwrap_err();
        assert_eq!(err.to_string(), "Cannot finalize shape while idle");
        assert!(wf.confirm().is_err());
        assert_eq!(wf.state(), &BindingState::Idle);

        wf.start_drawing().unwrap();
        assert!(wf.start_drawing().is_err());
        wf.cancel().unwrap();
        assert_eq!(wf.state(), &BindingState::Idle);
    }

    #[test]
    fn test_failed_save_restores_proposal() {
        let mut reg = registry();
        let mut wf = BindingWorkflow::new();
        wf.start_drawing().unwrap();
        wf.finalize(drawn(), Coordinate::new(-7.2499, 112.7684), &reg).unwrap();
        wf.confirm().unwrap();
        assert!(wf.cancel().is_err());

        let outcome = Err(FleetmapError::CatalogWrite {
            point_id: "15".to_string(),
            reason: "HTTP 500".to_string(),
        });
        let err = wf.finish_save(outcome, &mut reg).unwrap_err();
        assert!(err.is_user_visible());
        assert_eq!(wf.last_error(), Some("HTTP 500"));
        assert_eq!(wf.state().pending(), Some((&PointId::new("15"), &drawn())));
        assert!(reg.get(&"15".into()).unwrap().is_point_like());

        // retry succeeds
        wf.confirm().unwrap();
        assert!(wf.finish_save(Ok(()), &mut reg).unwrap());
        assert_eq!(wf.state(), &BindingState::Idle);
        assert_eq!(wf.last_error(), None);
        assert_eq!(reg.effective_geometry(&"15".into()), Some(drawn()));
    }

    #[test]
    fn test_save_into_unrelated_registry_keeps_proposal() {
        let reg = registry();
        let mut wf = BindingWorkflow::new();
        wf.start_drawing().unwrap();
        wf.finalize(drawn(), Coordinate::new(-7.2499, 112.7684), &reg).unwrap();
        wf.confirm().unwrap();

        let mut other = PointRegistry::from_points(vec![Point::new(
            "99",
            Coordinate::new(-7.0, 112.0),
            Category::Park,
        )]);
        let err = wf.finish_save(Ok(()), &mut other).unwrap_err();
        assert!(matches!(err, FleetmapError::PointNotFound { .. }));
        assert_eq!(wf.state().pending(), Some((&PointId::new("15"), &drawn())));
        assert!(wf.last_error().is_some());
        assert!(other.get(&"99".into()).unwrap().is_point_like());
    }
}
