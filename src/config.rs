//! Collection configuration.
//!
//! The configuration is serializable so it can be loaded from JSON, or
//! from TOML when the `toml` feature is enabled.

use crate::covering::SearchCoveringParameters;
use crate::error::{GeoCollectionError, Result};
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Collection configuration
///
/// # Example
///
/// ```rust
/// use geocollection::Config;
///
/// let config = Config::default();
/// assert_eq!(config.initial_capacity, 0);
///
/// let json = r#"{
///     "default_covering": { "min_level": 8, "max_level": 16, "max_cells": 12 },
///     "initial_capacity": 1024
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.default_covering.max_cells, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Covering parameters used by searches that do not pass their own.
    #[serde(default)]
    pub default_covering: SearchCoveringParameters,

    /// Number of items to pre-size the item maps for.
    #[serde(default)]
    pub initial_capacity: usize,
}

impl Config {
    pub fn with_default_covering(mut self, params: SearchCoveringParameters) -> Self {
        self.default_covering = params;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.default_covering
            .validate()
            .map_err(|e| format!("default_covering: {}", e))
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Read a configuration file.
    ///
    /// Files ending in `.toml` are parsed as TOML (requires the `toml`
    /// feature); everything else is parsed as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            #[cfg(feature = "toml")]
            return Self::from_toml(&contents).map_err(|e| GeoCollectionError::Config(e.to_string()));

            #[cfg(not(feature = "toml"))]
            return Err(GeoCollectionError::Config(format!(
                "{} is a TOML file but the `toml` feature is disabled",
                path.display()
            )));
        }

        Ok(Self::from_json(&contents)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_covering: SearchCoveringParameters::default(),
            initial_capacity: 0,
        }
    }
}
