//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::analysis::ranking::MAX_PRECISION;
use crate::analysis::Grouping;
use crate::core::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Windowing and ranking parameters.
    pub analysis: AnalysisConfig,
    /// Heatmap output.
    pub heatmap: HeatmapConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// Errors if the file does not exist. Use this for explicit `--config` flags.
    /// Env vars with `FLIPRATE_` prefix override file values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed("FLIPRATE_").split("__"))
            .extract()
            .map_err(|e| Error::config(e.to_string()))
    }

    /// Load configuration from directory, looking for fliprate.toml or
    /// .fliprate/fliprate.toml.
    ///
    /// Missing files are silently skipped (defaults are used).
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join("fliprate.toml")))
            .merge(Toml::file(dir.join(".fliprate/fliprate.toml")))
            .merge(Env::prefixed("FLIPRATE_").split("__"))
            .extract()
            .map_err(|e| Error::config(e.to_string()))
    }

    /// Create default config file content.
    pub fn default_toml() -> &'static str {
        include_str!("default_config.toml")
    }

    /// Reject parameter combinations the analysis cannot run with.
    pub fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        if analysis.window_size == 0 {
            return Err(Error::config("analysis.window_size must be at least 1"));
        }
        if analysis.window_count == 0 {
            return Err(Error::config("analysis.window_count must be at least 1"));
        }
        if analysis.precision == 0 || analysis.precision > MAX_PRECISION {
            return Err(Error::config(format!(
                "analysis.precision must be between 1 and {MAX_PRECISION}"
            )));
        }
        Ok(())
    }
}

/// Windowing and ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Group runs by calendar days or by run count.
    pub grouping: Grouping,
    /// Days per window, or runs per window.
    pub window_size: u32,
    /// Number of windows of history to consider.
    pub window_count: u32,
    /// Number of tests to report.
    pub top_n: usize,
    /// Significant digits of the reported score.
    pub precision: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            grouping: Grouping::Runs,
            window_size: 5,
            window_count: 3,
            top_n: 10,
            precision: 4,
        }
    }
}

/// Heatmap rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Write an HTML heatmap of the ranked tests.
    pub enabled: bool,
    /// Directory the heatmap is written to.
    pub output_dir: PathBuf,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format.
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON format.
    Json,
    /// Markdown format.
    Markdown,
}
