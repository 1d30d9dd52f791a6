//! Configuration for endpoints, timeouts, and caching
//!
//! Settings are read from an optional JSON file. Any field missing from the
//! file takes its default, and the CLI can override individual values.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{EvictionPolicy, DEFAULT_TTL};
use crate::data::boundary::DATAV_BOUND_BASE_URL;
use crate::data::weather::OPEN_METEO_BASE_URL;
use crate::sweep::SweepConfig;

/// Name of the config file inside the platform config directory
const CONFIG_FILE_NAME: &str = "config.json";

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`Config`]
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Open-Meteo forecast endpoint
    pub weather_url: String,
    /// Base URL for boundary GeoJSON; point this at a proxy prefix if needed
    pub boundary_url: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// How long a cached weather record stays fresh, in milliseconds
    pub cache_ttl_ms: u64,
    /// Upper bound on cached weather entries (`None` means unbounded)
    pub cache_max_entries: Option<usize>,
    /// Seconds between background cache sweeps (`None` or 0 disables sweeping)
    pub sweep_interval_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weather_url: OPEN_METEO_BASE_URL.to_string(),
            boundary_url: DATAV_BOUND_BASE_URL.to_string(),
            request_timeout_ms: 10_000,
            cache_ttl_ms: DEFAULT_TTL.as_millis() as u64,
            cache_max_entries: None,
            sweep_interval_secs: None,
        }
    }
}

impl Config {
    /// Path of the config file in the platform config directory
    ///
    /// Uses `~/.config/geoweather/config.json` on Linux. Returns `None` if
    /// there is no home directory.
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "geoweather")?;
        Some(project_dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Loads the config from the platform config directory
    ///
    /// A missing file is not an error; defaults are returned instead.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads the config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        match self.cache_max_entries {
            Some(capacity) => EvictionPolicy::MaxEntries(capacity),
            None => EvictionPolicy::Unbounded,
        }
    }

    pub fn sweep_config(&self) -> SweepConfig {
        match self.sweep_interval_secs {
            Some(secs) if secs > 0 => SweepConfig {
                interval: Duration::from_secs(secs),
                enabled: true,
            },
            _ => SweepConfig::default(),
        }
    }
}
