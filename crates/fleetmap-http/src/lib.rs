//! Fleetmap HTTP - reqwest adapters for the external collaborators
//!
//! Implements the core ports against the catalog backend, the optimization
//! service and an OSRM-compatible road router.

pub mod catalog;
pub mod client;
pub mod optimizer;
pub mod osrm;

pub use catalog::HttpCatalog;
pub use client::build_client;
pub use optimizer::HttpOptimizer;
pub use osrm::OsrmRouter;
