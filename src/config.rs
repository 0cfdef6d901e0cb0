//! Configuration for the controller, the HTTP client and logging.
//!
//! Every field has a default, so an empty or partial TOML file is valid.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub map: MapConfig,
    pub diagnostics: DiagnosticsConfig,
    pub log: LogConfig,
}

/// Remote dashboard API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL the `/api/...` paths are appended to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    #[inline]
    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

/// Map viewport behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// `[lat, lon]` of the national view
    pub national_center: [f64; 2],
    pub national_zoom: u8,
    pub padding: PaddingConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            national_center: [-9.189, -75.0152],
            national_zoom: 5,
            padding: PaddingConfig::default(),
        }
    }
}

/// Pixel padding used when fitting the viewport to a highlighted feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingConfig {
    pub department: u32,
    pub province: u32,
    pub district: u32,
}

impl Default for PaddingConfig {
    fn default() -> Self {
        Self { department: 30, province: 40, district: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// How many available names to log when a boundary lookup misses
    pub sample_names: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { sample_names: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when neither RUST_LOG nor -v is given
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "warn".to_string() }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse configuration")
    }

    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else { return Ok(Self::default()) };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}
