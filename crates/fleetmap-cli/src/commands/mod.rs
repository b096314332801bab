//! Command implementations

mod config;
mod nearest;
mod optimize;
mod render;

use crate::cli::{Cli, Commands};
use crate::config_loader::{http_client, load_config};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use fleetmap_core::config::LayeredConfig;
use fleetmap_core::ports::CatalogService;
use fleetmap_core::registry::PointRegistry;
use fleetmap_http::HttpCatalog;
use std::fs;
use std::path::Path;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Render(args) => render::execute(args, &config, &output).await,
        Commands::Nearest(args) => nearest::execute(args, &config, &output).await,
        Commands::Optimize(args) => optimize::execute(args, &config, &output).await,
        Commands::Config => config::execute(&config, &output),
    }
}

/// Read a JSON file
pub(crate) fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Point records from a file, or from the catalog when no file is given
pub(crate) async fn load_registry(
    points: Option<&Path>,
    config: &LayeredConfig,
) -> Result<PointRegistry> {
    let records = match points {
        Some(path) => match read_json(path)? {
            serde_json::Value::Array(records) => records,
            _ => anyhow::bail!("{} must contain a JSON array of point records", path.display()),
        },
        None => {
            let catalog = HttpCatalog::new(config.catalog_url.value.clone(), http_client(config)?);
            catalog.list_points().await?
        }
    };

    let registry = PointRegistry::load(&records);
    if registry.len() < records.len() {
        tracing::info!(
            loaded = registry.len(),
            skipped = records.len() - registry.len(),
            "Some point records were skipped"
        );
    }
    Ok(registry)
}
