//! Handing a picked coordinate from the map to the consuming screen
//!
//! Two transports exist and exactly one is active per app, chosen by
//! configuration. `Direct` writes the store before navigating. `Params`
//! encodes the coordinate into `lat`/`lng` route parameters which the Home
//! screen ingests once per mount through a [`HandoffReceiver`].

use crate::models::{Coordinate, Location};
use crate::navigation::{NavigationFabric, Route, RouteParams};
use crate::store::LocationStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const LAT_PARAM: &str = "lat";
pub const LNG_PARAM: &str = "lng";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffTransport {
    /// Write the store, then replace the route with the Location screen
    #[default]
    Direct,
    /// Replace the route with Home carrying `lat`/`lng` parameters
    Params,
}

impl HandoffTransport {
    /// Hand `location` over to the consuming screen
    pub fn send(&self, location: Location, store: &LocationStore, nav: &dyn NavigationFabric) {
        match self {
            HandoffTransport::Direct => {
                store.set(Some(location));
                // replace so the map doesn't pile up on the stack
                nav.replace(Route::location());
            }
            HandoffTransport::Params => {
                let pending = PendingHandoff {
                    coordinate: location.coordinate,
                };
                nav.replace(pending.to_route(Route::home()));
            }
        }
    }
}

/// Coordinate travelling inside route parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingHandoff {
    pub coordinate: Coordinate,
}

impl PendingHandoff {
    /// Attach the coordinate to `route` as `lat`/`lng`
    #[must_use]
    pub fn to_route(&self, route: Route) -> Route {
        route
            .with_param(LAT_PARAM, self.coordinate.latitude().to_string())
            .with_param(LNG_PARAM, self.coordinate.longitude().to_string())
    }

    /// Read a handoff back from route parameters.
    ///
    /// Both parameters must be finite decimal numbers forming a valid
    /// coordinate; anything else means no handoff happened.
    #[must_use]
    pub fn from_params(params: &RouteParams) -> Option<Self> {
        let latitude = parse_finite(params.get(LAT_PARAM)?)?;
        let longitude = parse_finite(params.get(LNG_PARAM)?)?;
        let coordinate = Coordinate::new(latitude, longitude).ok()?;
        Some(Self { coordinate })
    }
}

impl PendingHandoff {
    /// Write the store, then clear the parameters from the current route, so
    /// the pick survives the route replacement.
    pub fn apply(&self, store: &LocationStore, nav: &dyn NavigationFabric) -> Location {
        let location = Location::at(self.coordinate);
        store.set(Some(location.clone()));
        nav.replace(Route::new(nav.current_route().path));

        info!("Applied handoff at {}", self.coordinate.format_coordinates());
        location
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One-shot ingestion guard owned by the consuming screen's mount
#[derive(Debug, Default)]
pub struct HandoffReceiver {
    applied: bool,
}

impl HandoffReceiver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn applied(&self) -> bool {
        self.applied
    }

    /// Take a parameter-encoded handoff off the current route at most once.
    ///
    /// Only marks the handoff as consumed; [`PendingHandoff::apply`] does the
    /// writing, so callers can release their own locks first.
    pub fn claim(&mut self, nav: &dyn NavigationFabric) -> Option<PendingHandoff> {
        if self.applied {
            return None;
        }

        let route = nav.current_route();
        if !route.params.contains_key(LAT_PARAM) && !route.params.contains_key(LNG_PARAM) {
            return None;
        }
        let Some(pending) = PendingHandoff::from_params(&route.params) else {
            debug!("Ignoring malformed handoff parameters on {}", route);
            return None;
        };

        self.applied = true;
        Some(pending)
    }

    /// Claim and apply in one step. Returns the applied location.
    pub fn ingest(
        &mut self,
        store: &LocationStore,
        nav: &dyn NavigationFabric,
    ) -> Option<Location> {
        self.claim(nav).map(|pending| pending.apply(store, nav))
    }
}
