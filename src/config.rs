//! Configuration management for the `Floodcast` core
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::FloodcastError;
use crate::handoff::HandoffTransport;
use crate::models::{Coordinate, Region};
use crate::position::Accuracy;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `Floodcast` core
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FloodcastConfig {
    /// Map screen settings
    #[serde(default)]
    pub map: MapConfig,
    /// Home screen settings
    #[serde(default)]
    pub home: HomeConfig,
    /// Handoff transport selection
    #[serde(default)]
    pub handoff: HandoffConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Map screen configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Viewport center latitude used when no position is known
    #[serde(default = "default_fallback_latitude")]
    pub fallback_latitude: f64,
    /// Viewport center longitude used when no position is known
    #[serde(default = "default_fallback_longitude")]
    pub fallback_longitude: f64,
    /// Latitude span of the fallback viewport in degrees
    #[serde(default = "default_fallback_latitude_span")]
    pub fallback_latitude_span: f64,
    /// Longitude span of the fallback viewport in degrees
    #[serde(default = "default_fallback_longitude_span")]
    pub fallback_longitude_span: f64,
    /// Span of the region built around an acquired or tapped point
    #[serde(default = "default_pick_span")]
    pub pick_span: f64,
    /// Animation length when the map opens on the device position
    #[serde(default = "default_open_animation_ms")]
    pub open_animation_ms: u64,
    /// Animation length after a tap
    #[serde(default = "default_tap_animation_ms")]
    pub tap_animation_ms: u64,
    /// Animation length for "center on me"
    #[serde(default = "default_recenter_animation_ms")]
    pub recenter_animation_ms: u64,
    /// Accuracy hint for map acquisitions
    #[serde(default = "default_map_accuracy")]
    pub accuracy: Accuracy,
}

/// Home screen configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeConfig {
    /// Accuracy hint for "Get My Location"
    #[serde(default = "default_home_accuracy")]
    pub accuracy: Accuracy,
    /// How long the "Location selected" toast stays visible
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
}

/// Handoff configuration settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HandoffConfig {
    /// How the map screen hands a pick to the consuming screen
    #[serde(default)]
    pub transport: HandoffTransport,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_fallback_latitude() -> f64 {
    37.78825
}

fn default_fallback_longitude() -> f64 {
    -122.4324
}

fn default_fallback_latitude_span() -> f64 {
    0.0922
}

fn default_fallback_longitude_span() -> f64 {
    0.0421
}

fn default_pick_span() -> f64 {
    0.01
}

fn default_open_animation_ms() -> u64 {
    500
}

fn default_tap_animation_ms() -> u64 {
    300
}

fn default_recenter_animation_ms() -> u64 {
    400
}

fn default_map_accuracy() -> Accuracy {
    Accuracy::Balanced
}

fn default_home_accuracy() -> Accuracy {
    Accuracy::Highest
}

fn default_toast_duration_ms() -> u64 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
            fallback_latitude_span: default_fallback_latitude_span(),
            fallback_longitude_span: default_fallback_longitude_span(),
            pick_span: default_pick_span(),
            open_animation_ms: default_open_animation_ms(),
            tap_animation_ms: default_tap_animation_ms(),
            recenter_animation_ms: default_recenter_animation_ms(),
            accuracy: default_map_accuracy(),
        }
    }
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            accuracy: default_home_accuracy(),
            toast_duration_ms: default_toast_duration_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl MapConfig {
    /// Viewport shown while no position is known
    pub fn fallback_region(&self) -> crate::Result<Region> {
        let center = Coordinate::new(self.fallback_latitude, self.fallback_longitude)?;
        Region::new(
            center,
            self.fallback_latitude_span,
            self.fallback_longitude_span,
        )
    }

    #[must_use]
    pub fn open_animation(&self) -> Duration {
        Duration::from_millis(self.open_animation_ms)
    }

    #[must_use]
    pub fn tap_animation(&self) -> Duration {
        Duration::from_millis(self.tap_animation_ms)
    }

    #[must_use]
    pub fn recenter_animation(&self) -> Duration {
        Duration::from_millis(self.recenter_animation_ms)
    }
}

impl HomeConfig {
    #[must_use]
    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

impl FloodcastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. FLOODCAST_HANDOFF__TRANSPORT=params
        builder = builder.add_source(
            Environment::with_prefix("FLOODCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: FloodcastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("floodcast").join("config.toml"))
    }

    /// Apply default values to zeroed or empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.map.fallback_latitude_span == 0.0 {
            self.map.fallback_latitude_span = default_fallback_latitude_span();
        }
        if self.map.fallback_longitude_span == 0.0 {
            self.map.fallback_longitude_span = default_fallback_longitude_span();
        }
        if self.map.pick_span == 0.0 {
            self.map.pick_span = default_pick_span();
        }
        if self.home.toast_duration_ms == 0 {
            self.home.toast_duration_ms = default_toast_duration_ms();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_map()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_map(&self) -> Result<()> {
        self.map
            .fallback_region()
            .map_err(|e| FloodcastError::config(format!("Invalid fallback region: {e}")))?;

        for (name, span) in [
            ("fallback latitude span", self.map.fallback_latitude_span),
            ("fallback longitude span", self.map.fallback_longitude_span),
        ] {
            if span > 180.0 {
                return Err(
                    FloodcastError::config(format!("Map {name} cannot exceed 180 degrees")).into(),
                );
            }
        }

        if !(self.map.pick_span > 0.0 && self.map.pick_span <= 10.0) {
            return Err(FloodcastError::config(
                "Map pick span must be greater than 0 and at most 10 degrees",
            )
            .into());
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        for (name, ms) in [
            ("open", self.map.open_animation_ms),
            ("tap", self.map.tap_animation_ms),
            ("recenter", self.map.recenter_animation_ms),
        ] {
            if ms > 10_000 {
                return Err(FloodcastError::config(format!(
                    "Map {name} animation cannot exceed 10000 ms"
                ))
                .into());
            }
        }

        if !(500..=30_000).contains(&self.home.toast_duration_ms) {
            return Err(FloodcastError::config(
                "Toast duration must be between 500 and 30000 ms",
            )
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(FloodcastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(FloodcastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
