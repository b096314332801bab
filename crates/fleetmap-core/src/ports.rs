//! Port trait definitions
//!
//! These traits define the external collaborators that adapters must implement.

pub mod catalog;
pub mod optimizer;
pub mod routing;

pub use catalog::CatalogService;
pub use optimizer::Optimizer;
pub use routing::{RoadRouter, StraightLineRouter};
