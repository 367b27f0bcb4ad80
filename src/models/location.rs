//! Coordinate and selected-location models

use crate::{FloodcastError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees.
///
/// Only constructible through [`Coordinate::new`], so every value in the
/// program is finite and inside the valid latitude/longitude range.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = FloodcastError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        }
    }
}

impl Coordinate {
    /// Create a validated coordinate
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(FloodcastError::validation(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(FloodcastError::validation(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Format as `"lat, lon"` with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// The single currently selected point in the app
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub coordinate: Coordinate,
    /// Horizontal accuracy in meters, when the platform reported one
    pub accuracy: Option<f64>,
    /// When this location was produced
    pub timestamp: DateTime<Utc>,
}

impl Location {
    /// A location at `coordinate`, stamped with the current instant
    #[must_use]
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy: None,
            timestamp: Utc::now(),
        }
    }

    /// A location carrying a platform accuracy estimate
    #[must_use]
    pub fn with_accuracy(coordinate: Coordinate, accuracy: Option<f64>) -> Self {
        Self {
            accuracy,
            ..Self::at(coordinate)
        }
    }
}
