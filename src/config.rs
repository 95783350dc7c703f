//! Configuration management for wheelmatch
//!
//! Settings are loaded from environment variables with defaults. Command-line
//! flags override them in the CLI handlers.
//!
//! # Environment Variables
//!
//! - `WHEELMATCH_CATALOG_URL`: Default catalog location (path, `file://` or `http(s)://`)
//! - `WHEELMATCH_CACHE_ENABLED`: Cache fetched catalogs (true|false) - default: "true"
//! - `WHEELMATCH_CACHE_DIR`: Cache directory - default: user cache dir + "wheelmatch"
//! - `WHEELMATCH_CACHE_TTL`: Cache freshness in seconds - default: "3600"
//! - `WHEELMATCH_REQUEST_TIMEOUT`: Fetch timeout in seconds - default: "30"
//! - `WHEELMATCH_H1_MARKER`: Level-1 heading marker - default: "# "
//! - `WHEELMATCH_H2_MARKER`: Level-2 heading marker - default: "## "
//! - `WHEELMATCH_LOG_LEVEL`: Logging level - default: "info"
//! - `WHEELMATCH_LOG_JSON`: Emit logs as JSON (true|false) - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use wheelmatch::WheelmatchConfig;
//!
//! let config = WheelmatchConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::extractors::markdown::{DEFAULT_LEVEL1_MARKER, DEFAULT_LEVEL2_MARKER};
use crate::extractors::HeadingMarkers;
use crate::fetch::cache::DEFAULT_TTL_SECS;
use crate::fetch::http::DEFAULT_TIMEOUT_SECS;
use crate::util::logging::{try_parse_level, LEVEL_NAMES};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_CACHE_ENABLED: bool = true;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WheelmatchConfig {
    /// Catalog used when `--catalog` is not given
    pub catalog_url: Option<String>,

    pub cache_enabled: bool,

    pub cache_dir: Option<PathBuf>,

    pub cache_ttl_secs: u64,

    pub request_timeout_secs: u64,

    pub h1_marker: String,

    pub h2_marker: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    pub log_json: bool,
}

impl Default for WheelmatchConfig {
    /// Loads from `WHEELMATCH_*` environment variables. Unparseable values
    /// fall back to the default; use [`WheelmatchConfig::from_env`] to
    /// reject them instead.
    fn default() -> Self {
        let cache_enabled = env_parse("WHEELMATCH_CACHE_ENABLED")
            .ok()
            .flatten()
            .unwrap_or(DEFAULT_CACHE_ENABLED);

        Self {
            catalog_url: env_string("WHEELMATCH_CATALOG_URL"),
            cache_enabled,
            cache_dir: cache_dir(),
            cache_ttl_secs: env_parse("WHEELMATCH_CACHE_TTL")
                .ok()
                .flatten()
                .unwrap_or(DEFAULT_TTL_SECS),
            request_timeout_secs: env_parse("WHEELMATCH_REQUEST_TIMEOUT")
                .ok()
                .flatten()
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            h1_marker: env_marker("WHEELMATCH_H1_MARKER", DEFAULT_LEVEL1_MARKER),
            h2_marker: env_marker("WHEELMATCH_H2_MARKER", DEFAULT_LEVEL2_MARKER),
            log_level: env_string("WHEELMATCH_LOG_LEVEL")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
                .to_lowercase(),
            log_json: env_parse("WHEELMATCH_LOG_JSON").ok().flatten().unwrap_or(false),
        }
    }
}

impl WheelmatchConfig {
    /// Strict variant of `default()`: numeric and boolean variables that do
    /// not parse are reported instead of ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(enabled) = env_parse("WHEELMATCH_CACHE_ENABLED")? {
            config.cache_enabled = enabled;
        }
        if let Some(ttl) = env_parse("WHEELMATCH_CACHE_TTL")? {
            config.cache_ttl_secs = ttl;
        }
        if let Some(timeout) = env_parse("WHEELMATCH_REQUEST_TIMEOUT")? {
            config.request_timeout_secs = timeout;
        }
        if let Some(json) = env_parse("WHEELMATCH_LOG_JSON")? {
            config.log_json = json;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.h1_marker.trim().is_empty() || self.h2_marker.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Heading markers must not be empty".to_string(),
            ));
        }
        if self.h1_marker == self.h2_marker {
            return Err(ConfigError::ValidationFailed(format!(
                "Heading markers must differ (both are '{}')",
                self.h1_marker
            )));
        }

        if try_parse_level(&self.log_level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: {}",
                self.log_level, LEVEL_NAMES
            )));
        }

        Ok(())
    }

    pub fn heading_markers(&self) -> HeadingMarkers {
        HeadingMarkers::new(self.h1_marker.clone(), self.h2_marker.clone())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Cache directory when caching is enabled and a directory is known.
    pub fn active_cache_dir(&self) -> Option<&PathBuf> {
        self.cache_dir.as_ref().filter(|_| self.cache_enabled)
    }

    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();

        if let Some(ref url) = self.catalog_url {
            map.insert("catalog_url".to_string(), url.clone());
        }
        map.insert("cache_enabled".to_string(), self.cache_enabled.to_string());
        if let Some(ref dir) = self.cache_dir {
            map.insert("cache_dir".to_string(), dir.display().to_string());
        }
        map.insert("cache_ttl_secs".to_string(), self.cache_ttl_secs.to_string());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert("h1_marker".to_string(), format!("{:?}", self.h1_marker));
        map.insert("h2_marker".to_string(), format!("{:?}", self.h2_marker));
        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert("log_json".to_string(), self.log_json.to_string());

        map
    }
}

impl fmt::Display for WheelmatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Wheelmatch Configuration:")?;
        writeln!(
            f,
            "  Catalog URL: {}",
            self.catalog_url.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(f, "  Cache Enabled: {}", self.cache_enabled)?;
        if let Some(ref dir) = self.cache_dir {
            writeln!(f, "  Cache Dir: {}", dir.display())?;
        }
        writeln!(f, "  Cache TTL: {}s", self.cache_ttl_secs)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Heading Markers: {:?} / {:?}", self.h1_marker, self.h2_marker)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Heading markers keep their trailing space, so they are not trimmed.
fn env_marker(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match env_string(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .to_lowercase()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::ParseError {
                field: key.to_string(),
                error: e.to_string(),
            }),
    }
}

fn cache_dir() -> Option<PathBuf> {
    env_string("WHEELMATCH_CACHE_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::cache_dir().map(|dir| dir.join("wheelmatch")))
        .or_else(|| Some(env::temp_dir().join("wheelmatch-cache")))
}
