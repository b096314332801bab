//! Configuration loading utilities for CLI commands

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use fleetmap_core::config::{CliConfigOverrides, LayeredConfig};
use fleetmap_http::build_client;

/// Load layered configuration: defaults, optional file, environment, flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = &cli.config {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }
    let mut config = config.load_from_env();

    let (lookup_timeout_ms, vehicle_capacity_l) = match &cli.command {
        Commands::Render(args) => (args.lookup_timeout_ms, args.capacity),
        _ => (None, None),
    };
    config.update_from_cli(CliConfigOverrides {
        catalog_url: cli.catalog_url.clone(),
        road_router_url: cli.router_url.clone(),
        lookup_timeout_ms,
        vehicle_capacity_l,
    });
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

/// HTTP client honoring the configured request timeout
pub fn http_client(config: &LayeredConfig) -> Result<reqwest::Client> {
    build_client(config.request_timeout()).context("Failed to create HTTP client")
}
