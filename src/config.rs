//! Configuration management for tibber-price
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files with support for environment variable overrides.

use crate::error::{PriceError, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod defaults;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "TIBBER_PRICE_CONFIG";

/// Environment variable overriding `tibber.access_token`
pub const ACCESS_TOKEN_ENV: &str = "TIBBER_ACCESS_TOKEN";

/// Environment variable overriding `tibber.home_id`
pub const HOME_ID_ENV: &str = "TIBBER_HOME_ID";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tibber API access and price display options
    pub tibber: TibberConfig,

    /// Where day files are stored
    pub storage: StorageConfig,

    /// Which sensors the host binary polls
    pub sensors: SensorsConfig,

    /// Chart series refresh
    pub chart: ChartConfig,

    /// Polling cadence of the host binary
    pub scheduler: SchedulerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// IANA time zone used to derive calendar days and hours
    ///
    /// Not taken from the host; set it to the zone of the metering point.
    pub timezone: String,
}

/// Tibber API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TibberConfig {
    /// Tibber API access token (required)
    pub access_token: String,

    /// Optional specific home ID; the first home is used when absent
    pub home_id: Option<String>,

    /// Display prices including tax
    pub price_inc_tax: bool,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage root; day files live in `<path>/tibber-price/`
    pub path: String,
}

/// Sensor toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    /// Current tax-adjusted price sensor
    pub activate_price_sensor: bool,

    /// Current price relative to today's maximum (0-100)
    pub activate_relative_price_sensor: bool,

    /// Relative price again, presented as a gauge
    pub activate_gauge_price_sensor: bool,
}

/// Price chart refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Refresh the chart series once per local hour
    pub activate_price_graphing: bool,
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Delay before the first poll after startup
    pub boot_delay_secs: u64,

    /// Interval between polls
    pub poll_interval_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Console level override
    pub console_level: Option<String>,

    /// File level override
    pub file_level: Option<String>,

    /// Path to log file (its parent directory holds the rolling files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `TIBBER_PRICE_CONFIG` or the first existing
    /// default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = Self::load_from(explicit.as_deref())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `explicit`, which must exist, or else from the first
    /// existing default location, or else defaults
    pub fn load_from(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(PriceError::config(format!(
                    "Configuration file {} does not exist",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        let defaults = [
            Path::new("tibber_price.yaml"),
            Path::new("/etc/tibber-price/config.yaml"),
        ];
        match defaults.iter().find(|p| p.exists()) {
            Some(path) => Self::from_file(path),
            None => Ok(Config::default()),
        }
    }

    /// Overlay `TIBBER_ACCESS_TOKEN` / `TIBBER_HOME_ID` when set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV)
            && !token.trim().is_empty()
        {
            self.tibber.access_token = token;
        }
        if let Ok(home_id) = std::env::var(HOME_ID_ENV)
            && !home_id.trim().is_empty()
        {
            self.tibber.home_id = Some(home_id);
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parsed time zone
    pub fn time_zone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| PriceError::validation("timezone".to_string(), e.to_string()))
    }

    /// Configured home id, with blank strings treated as absent
    pub fn home_id(&self) -> Option<&str> {
        self.tibber
            .home_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.tibber.access_token.trim().is_empty() {
            return Err(PriceError::validation(
                "tibber.access_token",
                "Access token is required",
            ));
        }

        if self.storage.path.trim().is_empty() {
            return Err(PriceError::validation(
                "storage.path",
                "Storage path cannot be empty",
            ));
        }

        if self.scheduler.poll_interval_secs == 0 {
            return Err(PriceError::validation(
                "scheduler.poll_interval_secs",
                "Must be greater than 0",
            ));
        }

        crate::logging::parse_log_level(&self.logging.level).map_err(|_| {
            PriceError::validation(
                "logging.level".to_string(),
                format!("Invalid log level: {}", self.logging.level),
            )
        })?;

        self.time_zone()?;

        Ok(())
    }
}
