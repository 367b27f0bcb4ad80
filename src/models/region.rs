//! Map viewport model

use super::Coordinate;
use crate::{FloodcastError, Result};
use serde::{Deserialize, Serialize};

/// Visible map viewport described by its center and angular spans
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(try_from = "RawRegion")]
pub struct Region {
    pub center: Coordinate,
    /// Visible latitude extent in degrees
    pub latitude_span: f64,
    /// Visible longitude extent in degrees
    pub longitude_span: f64,
}

#[derive(Deserialize)]
struct RawRegion {
    center: Coordinate,
    latitude_span: f64,
    longitude_span: f64,
}

impl TryFrom<RawRegion> for Region {
    type Error = FloodcastError;

    fn try_from(raw: RawRegion) -> Result<Self> {
        Region::new(raw.center, raw.latitude_span, raw.longitude_span)
    }
}

impl Region {
    /// Create a region, rejecting non-positive or non-finite spans
    pub fn new(center: Coordinate, latitude_span: f64, longitude_span: f64) -> Result<Self> {
        for (name, span) in [("latitude", latitude_span), ("longitude", longitude_span)] {
            if !span.is_finite() || span <= 0.0 {
                return Err(FloodcastError::validation(format!(
                    "{name} span must be a positive number, got {span}"
                )));
            }
        }
        Ok(Self {
            center,
            latitude_span,
            longitude_span,
        })
    }

    /// Square region of `span` degrees centered on `center`
    #[must_use]
    pub fn around(center: Coordinate, span: f64) -> Self {
        Self {
            center,
            latitude_span: span,
            longitude_span: span,
        }
    }
}
