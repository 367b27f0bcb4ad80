//! Screen controllers
//!
//! Thin per-screen orchestration over the store, acquisition, map sync and
//! handoff:
//! - Home: device location on demand, parameter handoff ingestion
//! - Map: region/marker picking and committing a pick
//! - Location: selected coordinates and their forecast

pub mod home;
pub mod location;
pub mod map;

pub use home::{HomeScreen, HomeView, PrimaryAction, Toast};
pub use location::{LocationScreen, LocationView};
pub use map::MapScreen;
