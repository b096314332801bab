//! Fleetmap Core - Route geometry composition and spatial binding
//!
//! This crate turns optimization results into drawable per-vehicle geometry,
//! decides highlight/dimming state, binds hand-drawn shapes to catalog points
//! and derives the demand and urgency color encodings used at render time.

pub mod binding;
pub mod colors;
pub mod config;
pub mod error;
pub mod export;
pub mod focus;
pub mod geo;
pub mod models;
pub mod ports;
pub mod registry;
pub mod resolve;
pub mod session;

pub use error::{FleetmapError, Result};
