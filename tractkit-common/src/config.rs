//! Bootstrap configuration for TractKit
//!
//! Settings are read once at startup and never change while the service runs.
//!
//! # Sources Priority
//!
//! Config file location:
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`TRACTKIT_CONFIG`)
//! 3. Platform config directory (`~/.config/tractkit/config.toml` on Linux)
//! 4. Compiled defaults (no file)
//!
//! A missing file is never fatal: the service logs a warning and starts with
//! compiled defaults. A file that exists but does not parse is a hard error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TRACTKIT_CONFIG";

/// Environment variable carrying the statistical-survey API credential
pub const CENSUS_API_KEY_ENV_VAR: &str = "TRACTKIT_CENSUS_API_KEY";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5050;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP server port
    pub port: u16,

    /// Directory against which relative health-table paths are resolved
    pub data_dir: PathBuf,

    /// Statistical-survey API credential (environment takes priority)
    pub census_api_key: Option<String>,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// External service base URLs
    pub endpoints: EndpointConfig,

    /// Per-call timeouts for external services
    pub timeouts: TimeoutConfig,

    /// Survey year token → health-indicator table file
    pub health_tables: BTreeMap<String, PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (trace, debug, info, warn, error)
    pub level: String,
}

/// External service endpoints
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
    /// Root of the statistical-survey API (year and dataset path are appended)
    pub survey_base_url: String,
    /// Free-form address geocoder (Nominatim search endpoint)
    pub geocoder_url: String,
    /// Coordinate → geography lookup endpoint
    pub geography_url: String,
    /// User-Agent sent to the geocoder (required by its usage policy)
    pub user_agent: String,
}

/// Timeouts in seconds
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Geocoder and geography lookup calls
    pub geocode_secs: u64,
    /// Statistical-survey API calls
    pub survey_secs: u64,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from("."),
            census_api_key: None,
            logging: LoggingConfig::default(),
            endpoints: EndpointConfig::default(),
            timeouts: TimeoutConfig::default(),
            health_tables: default_health_tables(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            survey_base_url: "https://api.census.gov/data".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org/search".to_string(),
            geography_url: "https://geocoding.geo.census.gov/geocoder/geographies/coordinates"
                .to_string(),
            user_agent: get_user_agent(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            geocode_secs: 10,
            survey_secs: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn geocode(&self) -> Duration {
        Duration::from_secs(self.geocode_secs)
    }

    pub fn survey(&self) -> Duration {
        Duration::from_secs(self.survey_secs)
    }
}

impl TomlConfig {
    /// Path of the health-indicator table configured for a year token
    ///
    /// Relative paths are resolved against `data_dir`. Returns `None` when no
    /// table is configured for the year.
    pub fn health_table_path(&self, year: &str) -> Option<PathBuf> {
        let file = self.health_tables.get(year.trim())?;
        if file.is_absolute() {
            Some(file.clone())
        } else {
            Some(self.data_dir.join(file))
        }
    }
}

/// Standard User-Agent string for outbound requests
pub fn get_user_agent() -> String {
    format!("tractkit/{}", env!("CARGO_PKG_VERSION"))
}

const PLACES_FILE_PREFIX: &str = "PLACES__Local_Data_for_Better_Health__Census_Tract_Data";

/// PLACES tract-level releases shipped alongside the service
fn default_health_tables() -> BTreeMap<String, PathBuf> {
    ["2019", "2020", "2021", "2022", "2023", "2024"]
        .into_iter()
        .map(|year| {
            (
                year.to_string(),
                PathBuf::from(format!("{PLACES_FILE_PREFIX}_{year}_release_20250624.csv")),
            )
        })
        .collect()
}

/// Locate the config file to load, if any
///
/// Priority: CLI argument → `TRACTKIT_CONFIG` → platform config directory.
/// The CLI and environment paths are returned even when the file is absent so
/// the loader can warn about them.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("tractkit").join("config.toml"))
        .filter(|p| p.exists())
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load configuration with graceful degradation
///
/// - `None` → compiled defaults
/// - path that does not exist → warning + compiled defaults
/// - path that exists → parsed file (parse failure is an error)
pub fn load_config(path: Option<&Path>) -> Result<TomlConfig> {
    match path {
        None => {
            info!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
        Some(path) if !path.exists() => {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        Some(path) => {
            let config = load_toml_config(path)?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
    }
}

/// Resolve the statistical-survey API credential
///
/// **Priority:** ENV → TOML. Returns `None` when neither holds a usable key;
/// requests then go out without `key=`.
pub fn resolve_census_api_key(config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(CENSUS_API_KEY_ENV_VAR)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = config
        .census_api_key
        .as_ref()
        .filter(|k| is_valid_key(k))
        .cloned();

    if env_key.is_some() && toml_key.is_some() {
        warn!("Census API key found in environment and TOML; using environment");
    }

    match (env_key, toml_key) {
        (Some(key), _) => {
            info!("Census API key loaded from environment variable");
            Some(key.trim().to_string())
        }
        (None, Some(key)) => {
            info!("Census API key loaded from TOML config");
            Some(key.trim().to_string())
        }
        (None, None) => {
            warn!(
                "Census API key not configured (set {}); requests are unauthenticated",
                CENSUS_API_KEY_ENV_VAR
            );
            None
        }
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
