//! Configuration management for groundsafe.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::{DisplayRules, AIRPORT_SUFFIX, COMPANY_MAX_CHARS, ELLIPSIS};
use crate::stats::{ChartGeometry, DashboardOptions, LABEL_OFFSET, RATE_PRECISION, TRAILING_YEARS};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "groundsafe";

/// Default dataset file name.
const DATASET_FILE_NAME: &str = "catalog.json";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `GROUNDSAFE_`)
/// 2. TOML config file at `~/.config/groundsafe/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset configuration.
    pub dataset: DatasetConfig,
    /// Card display configuration.
    pub display: DisplayConfig,
    /// Dashboard configuration.
    pub dashboard: DashboardConfig,
}

/// Where the catalog and its images live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the catalog document.
    /// Defaults to `~/.local/share/groundsafe/catalog.json`
    pub path: Option<PathBuf>,
    /// Directory image URLs are resolved against.
    /// Images are not probed when unset.
    pub asset_root: Option<PathBuf>,
}

/// Card header display rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Company names longer than this are truncated.
    pub company_max_chars: usize,
    /// Marker appended to truncated company names.
    pub ellipsis: String,
    /// Token stripped from airport names.
    pub airport_suffix: String,
}

/// Dashboard layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Number of years in the summary strip.
    pub trailing_years: usize,
    /// Decimal places of the rate.
    pub rate_precision: usize,
    /// Outer radius of the airport ring.
    pub outer_radius: f64,
    /// Inner radius of the airport ring.
    pub inner_radius: f64,
    /// Gap between slices in degrees.
    pub padding_angle: f64,
    /// Distance of slice labels beyond the outer radius.
    pub label_offset: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            company_max_chars: COMPANY_MAX_CHARS,
            ellipsis: ELLIPSIS.to_string(),
            airport_suffix: AIRPORT_SUFFIX.to_string(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let geometry = ChartGeometry::default();
        Self {
            trailing_years: TRAILING_YEARS,
            rate_precision: RATE_PRECISION,
            outer_radius: geometry.outer_radius,
            inner_radius: geometry.inner_radius,
            padding_angle: geometry.padding_angle,
            label_offset: LABEL_OFFSET,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("GROUNDSAFE_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.display.company_max_chars == 0 {
            return Err(Error::config_validation(
                "company_max_chars must be greater than 0",
            ));
        }

        let dashboard = &self.dashboard;
        if dashboard.trailing_years == 0 {
            return Err(Error::config_validation(
                "trailing_years must be greater than 0",
            ));
        }

        if dashboard.inner_radius >= dashboard.outer_radius {
            return Err(Error::config_validation(format!(
                "inner_radius ({}) must be less than outer_radius ({})",
                dashboard.inner_radius, dashboard.outer_radius
            )));
        }

        if dashboard.padding_angle < 0.0 {
            return Err(Error::config_validation(
                "padding_angle cannot be negative",
            ));
        }

        if dashboard.label_offset < 0.0 {
            return Err(Error::config_validation("label_offset cannot be negative"));
        }

        Ok(())
    }

    /// Get the dataset path, resolving defaults if not set.
    #[must_use]
    pub fn dataset_path(&self) -> PathBuf {
        self.dataset
            .path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATASET_FILE_NAME))
    }

    /// Card display rules.
    #[must_use]
    pub fn display_rules(&self) -> DisplayRules {
        DisplayRules {
            company_max_chars: self.display.company_max_chars,
            ellipsis: self.display.ellipsis.clone(),
            airport_suffix: self.display.airport_suffix.clone(),
        }
    }

    /// Dashboard options.
    #[must_use]
    pub fn dashboard_options(&self) -> DashboardOptions {
        let dashboard = &self.dashboard;
        DashboardOptions {
            geometry: ChartGeometry {
                outer_radius: dashboard.outer_radius,
                inner_radius: dashboard.inner_radius,
                padding_angle: dashboard.padding_angle,
                label_offset: dashboard.label_offset,
                ..ChartGeometry::default()
            },
            trailing_years: dashboard.trailing_years,
            rate_precision: dashboard.rate_precision,
        }
    }
}
