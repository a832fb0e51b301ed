//! Layered configuration loading

use crate::{EndpointConfig, ServerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Overrides `endpoint.url`
pub const ENV_ENDPOINT_URL: &str = "GRAPHKB_ENDPOINT_URL";
/// Overrides `endpoint.default_graph` (empty string clears it)
pub const ENV_DEFAULT_GRAPH: &str = "GRAPHKB_DEFAULT_GRAPH";
/// Overrides `endpoint.timeout_secs`
pub const ENV_TIMEOUT_SECS: &str = "GRAPHKB_TIMEOUT_SECS";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was being parsed
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A field holds a value the service cannot use
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Dotted field name
        field: String,
        /// Offending value or reason
        value: String,
    },
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbConfig {
    /// Remote graph endpoint
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Tool server transport
    #[serde(default)]
    pub server: ServerConfig,
}

impl KbConfig {
    /// Default config file location: `<config_dir>/graphkb/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("graphkb").join("config.toml"))
    }

    /// Load configuration from defaults, an optional file, and the process environment.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used when present and skipped otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        let config = config.with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        info!(
            endpoint = %config.endpoint.url,
            timeout_secs = config.endpoint.timeout_secs,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `GRAPHKB_*` overrides read through `lookup`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_ENDPOINT_URL) {
            self.endpoint.url = url;
        }
        if let Some(graph) = lookup(ENV_DEFAULT_GRAPH) {
            self.endpoint.default_graph = Some(graph);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.endpoint.timeout_secs =
                raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: ENV_TIMEOUT_SECS.to_string(),
                    value: raw.clone(),
                })?;
        }
        Ok(self)
    }

    /// Check the endpoint URL is absolute HTTP(S) and the timeout is positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.endpoint.url).map_err(|e| ConfigError::InvalidValue {
            field: "endpoint.url".to_string(),
            value: format!("{} ({e})", self.endpoint.url),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "endpoint.url".to_string(),
                value: format!("{} (scheme must be http or https)", self.endpoint.url),
            });
        }
        if self.endpoint.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "endpoint.timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
