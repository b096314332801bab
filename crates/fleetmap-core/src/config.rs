use crate::error::{FleetmapError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for fleetmap
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub catalog_url: ConfigValue<String>,
    pub road_router_url: ConfigValue<String>,
    pub road_profile: ConfigValue<String>,
    pub lookup_timeout_ms: ConfigValue<u64>,
    pub max_concurrent_lookups: ConfigValue<usize>,
    pub vehicle_capacity_l: ConfigValue<f64>,
    pub request_timeout_ms: ConfigValue<u64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            catalog_url: ConfigValue::new(
                "http://localhost:8000".to_string(),
                ConfigSource::Default,
            ),
            road_router_url: ConfigValue::new(
                "https://router.project-osrm.org".to_string(),
                ConfigSource::Default,
            ),
            road_profile: ConfigValue::new("driving".to_string(), ConfigSource::Default),
            lookup_timeout_ms: ConfigValue::new(8000, ConfigSource::Default),
            max_concurrent_lookups: ConfigValue::new(8, ConfigSource::Default),
            vehicle_capacity_l: ConfigValue::new(5000.0, ConfigSource::Default),
            request_timeout_ms: ConfigValue::new(90_000, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| FleetmapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| FleetmapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(url) = file_config.catalog_url {
            self.catalog_url.update(url, ConfigSource::File);
        }

        if let Some(url) = file_config.road_router_url {
            self.road_router_url.update(url, ConfigSource::File);
        }

        if let Some(profile) = file_config.road_profile {
            self.road_profile.update(profile, ConfigSource::File);
        }

        if let Some(ms) = file_config.lookup_timeout_ms {
            self.lookup_timeout_ms.update(ms, ConfigSource::File);
        }

        if let Some(n) = file_config.max_concurrent_lookups {
            self.max_concurrent_lookups.update(n, ConfigSource::File);
        }

        if let Some(liters) = file_config.vehicle_capacity_l {
            self.vehicle_capacity_l.update(liters, ConfigSource::File);
        }

        if let Some(ms) = file_config.request_timeout_ms {
            self.request_timeout_ms.update(ms, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(url) = env::var("FLEETMAP_CATALOG_URL") {
            self.catalog_url.update(url, ConfigSource::Environment);
        }

        if let Ok(url) = env::var("FLEETMAP_ROAD_ROUTER_URL") {
            self.road_router_url.update(url, ConfigSource::Environment);
        }

        if let Ok(profile) = env::var("FLEETMAP_ROAD_PROFILE") {
            self.road_profile.update(profile, ConfigSource::Environment);
        }

        if let Some(ms) = parse_env("FLEETMAP_LOOKUP_TIMEOUT_MS", "milliseconds") {
            self.lookup_timeout_ms.update(ms, ConfigSource::Environment);
        }

        if let Some(n) = parse_env::<usize>("FLEETMAP_MAX_CONCURRENT_LOOKUPS", "positive integer") {
            if n > 0 {
                self.max_concurrent_lookups.update(n, ConfigSource::Environment);
            } else {
                tracing::warn!("Invalid FLEETMAP_MAX_CONCURRENT_LOOKUPS value '0': expected positive integer");
            }
        }

        if let Some(liters) = parse_env("FLEETMAP_VEHICLE_CAPACITY_L", "liters") {
            self.vehicle_capacity_l.update(liters, ConfigSource::Environment);
        }

        if let Some(ms) = parse_env("FLEETMAP_REQUEST_TIMEOUT_MS", "milliseconds") {
            self.request_timeout_ms.update(ms, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(url) = overrides.catalog_url {
            self.catalog_url.update(url, ConfigSource::Cli);
        }

        if let Some(url) = overrides.road_router_url {
            self.road_router_url.update(url, ConfigSource::Cli);
        }

        if let Some(ms) = overrides.lookup_timeout_ms {
            self.lookup_timeout_ms.update(ms, ConfigSource::Cli);
        }

        if let Some(liters) = overrides.vehicle_capacity_l {
            self.vehicle_capacity_l.update(liters, ConfigSource::Cli);
        }
    }

    /// Check values that cannot be expressed in the type
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_lookups.value == 0 {
            return Err(FleetmapError::ConfigInvalid {
                key: "max_concurrent_lookups".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.lookup_timeout_ms.value == 0 {
            return Err(FleetmapError::ConfigInvalid {
                key: "lookup_timeout_ms".to_string(),
                reason: "must be at least 1 ms".to_string(),
            });
        }
        if !self.vehicle_capacity_l.value.is_finite() {
            return Err(FleetmapError::ConfigInvalid {
                key: "vehicle_capacity_l".to_string(),
                reason: "must be a finite number".to_string(),
            });
        }
        for (key, url) in [("catalog_url", &self.catalog_url), ("road_router_url", &self.road_router_url)] {
            if url.value.trim().is_empty() {
                return Err(FleetmapError::ConfigMissing { key: key.to_string() });
            }
        }
        Ok(())
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms.value)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.value)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "catalog_url".to_string(),
            (self.catalog_url.value.clone(), self.catalog_url.source),
        );
        map.insert(
            "road_router_url".to_string(),
            (self.road_router_url.value.clone(), self.road_router_url.source),
        );
        map.insert(
            "road_profile".to_string(),
            (self.road_profile.value.clone(), self.road_profile.source),
        );
        map.insert(
            "lookup_timeout_ms".to_string(),
            (format!("{} ms", self.lookup_timeout_ms.value), self.lookup_timeout_ms.source),
        );
        map.insert(
            "max_concurrent_lookups".to_string(),
            (self.max_concurrent_lookups.value.to_string(), self.max_concurrent_lookups.source),
        );
        map.insert(
            "vehicle_capacity_l".to_string(),
            (format!("{} L", self.vehicle_capacity_l.value), self.vehicle_capacity_l.source),
        );
        map.insert(
            "request_timeout_ms".to_string(),
            (format!("{} ms", self.request_timeout_ms.value), self.request_timeout_ms.source),
        );

        map
    }
}

fn parse_env<T: FromStr>(key: &str, expected: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected {}", key, raw, expected);
            None
        }
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    catalog_url: Option<String>,
    road_router_url: Option<String>,
    road_profile: Option<String>,
    lookup_timeout_ms: Option<u64>,
    max_concurrent_lookups: Option<usize>,
    vehicle_capacity_l: Option<f64>,
    request_timeout_ms: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub catalog_url: Option<String>,
    pub road_router_url: Option<String>,
    pub lookup_timeout_ms: Option<u64>,
    pub vehicle_capacity_l: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.catalog_url.value, "http://localhost:8000");
        assert_eq!(config.catalog_url.source, ConfigSource::Default);
        assert_eq!(config.lookup_timeout(), Duration::from_secs(8));
        assert_eq!(config.max_concurrent_lookups.value, 8);
        assert_eq!(config.vehicle_capacity_l.value, 5000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
catalog_url = "http://catalog.internal:8000"
lookup_timeout_ms = 2500
max_concurrent_lookups = 4
vehicle_capacity_l = 8000.0
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.catalog_url.value, "http://catalog.internal:8000");
        assert_eq!(config.catalog_url.source, ConfigSource::File);
        assert_eq!(config.lookup_timeout_ms.value, 2500);
        assert_eq!(config.max_concurrent_lookups.value, 4);
        assert_eq!(config.vehicle_capacity_l.value, 8000.0);
        assert_eq!(config.road_profile.source, ConfigSource::Default);
    }

    #[test]
    fn test_load_from_bad_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "lookup_timeout_ms = \"soon\"").unwrap();

        let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, FleetmapError::ConfigInvalid { .. }));
    }

    #[test]
    #[serial]
    fn test_load_from_env() {
        env::set_var("FLEETMAP_ROAD_ROUTER_URL", "http://osrm.local:5000");
        env::set_var("FLEETMAP_LOOKUP_TIMEOUT_MS", "1200");
        env::set_var("FLEETMAP_VEHICLE_CAPACITY_L", "lots");

        let config = LayeredConfig::with_defaults().load_from_env();

        env::remove_var("FLEETMAP_ROAD_ROUTER_URL");
        env::remove_var("FLEETMAP_LOOKUP_TIMEOUT_MS");
        env::remove_var("FLEETMAP_VEHICLE_CAPACITY_L");

        assert_eq!(config.road_router_url.value, "http://osrm.local:5000");
        assert_eq!(config.road_router_url.source, ConfigSource::Environment);
        assert_eq!(config.lookup_timeout_ms.value, 1200);
        // unparsable values are ignored
        assert_eq!(config.vehicle_capacity_l.value, 5000.0);
        assert_eq!(config.vehicle_capacity_l.source, ConfigSource::Default);
    }

    #[test]
    #[serial]
    fn test_env_zero_concurrency_is_ignored() {
        env::set_var("FLEETMAP_MAX_CONCURRENT_LOOKUPS", "0");
        let config = LayeredConfig::with_defaults().load_from_env();
        env::remove_var("FLEETMAP_MAX_CONCURRENT_LOOKUPS");

        assert_eq!(config.max_concurrent_lookups.value, 8);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            catalog_url: Some("http://10.0.0.5:8000".to_string()),
            lookup_timeout_ms: Some(500),
            ..Default::default()
        };

        config.update_from_cli(overrides);

        assert_eq!(config.catalog_url.value, "http://10.0.0.5:8000");
        assert_eq!(config.catalog_url.source, ConfigSource::Cli);
        assert_eq!(config.lookup_timeout_ms.value, 500);
        // These should still be defaults
        assert_eq!(config.road_router_url.source, ConfigSource::Default);
        assert_eq!(config.vehicle_capacity_l.source, ConfigSource::Default);
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            catalog_url: Some("  ".to_string()),
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(FleetmapError::ConfigMissing { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_lookup_timeout() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides { lookup_timeout_ms: Some(0), ..Default::default() });

        let err = config.validate().unwrap_err();
        assert!(matches!(err, FleetmapError::ConfigInvalid { ref key, .. } if key == "lookup_timeout_ms"));
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert_eq!(map.len(), 7);
        let (timeout, source) = &map["lookup_timeout_ms"];
        assert_eq!(timeout, "8000 ms");
        assert_eq!(*source, ConfigSource::Default);
    }
}
