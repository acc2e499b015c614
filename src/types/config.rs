//! Configuration for routeview.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::RouteViewResult;

/// Main configuration for routeview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// View slot settings.
    #[serde(default)]
    pub view: ViewConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Production mode silences configuration warnings.
    #[serde(default)]
    pub production: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            production: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Options recognized by a view slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewConfig {
    /// Named slot this view renders.
    #[serde(default = "default_view_name")]
    pub name: String,

    /// Cache capacity (0 = unbounded).
    #[serde(default)]
    pub max: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            name: default_view_name(),
            max: 0,
        }
    }
}

impl ViewConfig {
    /// Creates options for a named slot with the given capacity.
    pub fn new(name: impl Into<String>, max: usize) -> Self {
        Self {
            name: name.into(),
            max,
        }
    }
}

fn default_view_name() -> String {
    "default".to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> RouteViewResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RouteViewResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
