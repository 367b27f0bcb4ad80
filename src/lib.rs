//! `Floodcast` - location selection and short-horizon flood-risk forecasts
//!
//! This library provides the core of the app: the single selected-location
//! store, device position acquisition, map region/marker reconciliation,
//! handoff of a map pick between screens, and the forecast derivation.

pub mod config;
pub mod error;
pub mod forecast;
pub mod handoff;
pub mod logging;
pub mod map_sync;
pub mod models;
pub mod navigation;
pub mod platform;
pub mod position;
pub mod screens;
pub mod store;

// Re-export core types for public API
pub use config::FloodcastConfig;
pub use error::FloodcastError;
pub use forecast::ForecastEngine;
pub use handoff::{HandoffReceiver, HandoffTransport, PendingHandoff};
pub use map_sync::{AcquireOutcome, MapSyncController, MapView};
pub use models::{Coordinate, ForecastEntry, Location, Region, RiskLevel};
pub use navigation::{MemoryNavigator, NavigationFabric, Route, RoutePath};
pub use position::{Accuracy, PermissionProvider, PositionAcquisition, PositionProvider};
pub use screens::{HomeScreen, LocationScreen, MapScreen};
pub use store::LocationStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, FloodcastError>;
