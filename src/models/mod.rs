//! Data models for the Floodcast core
//!
//! This module contains the core domain models organized by concern:
//! - Location: validated coordinates and the selected location
//! - Region: the visible map viewport
//! - Forecast: derived flood-risk entries

pub mod forecast;
pub mod location;
pub mod region;

// Re-export all public types for convenient access
pub use forecast::{ForecastEntry, RiskLevel};
pub use location::{Coordinate, Location};
pub use region::Region;
