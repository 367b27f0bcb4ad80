//! Location screen controller
//!
//! Shows the selected coordinates and their flood-risk forecast, refreshed
//! on every store change while mounted.

use crate::forecast::ForecastEngine;
use crate::models::{ForecastEntry, Location};
use crate::navigation::{NavigationFabric, Route};
use crate::store::{LocationStore, Subscription};
use std::sync::{Arc, Mutex};

pub const NO_LOCATION_MESSAGE: &str = "No location selected.";

#[derive(Debug, Clone, PartialEq)]
pub enum LocationView {
    Empty,
    Selected {
        location: Location,
        forecast: Vec<ForecastEntry>,
    },
}

impl LocationView {
    fn derive(location: Option<&Location>) -> Self {
        match location {
            Some(location) => LocationView::Selected {
                location: location.clone(),
                forecast: ForecastEngine::forecast_location(location),
            },
            None => LocationView::Empty,
        }
    }

    /// Text lines as the screen lays them out
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            LocationView::Empty => vec![NO_LOCATION_MESSAGE.to_string()],
            LocationView::Selected { location, forecast } => {
                let mut lines = vec![
                    "Selected coordinates".to_string(),
                    format!("Latitude: {}", location.coordinate.latitude()),
                    format!("Longitude: {}", location.coordinate.longitude()),
                ];
                lines.extend(forecast.iter().map(ForecastEntry::format_line));
                lines
            }
        }
    }
}

pub struct LocationScreen {
    store: LocationStore,
    nav: Arc<dyn NavigationFabric>,
    view: Arc<Mutex<LocationView>>,
    subscription: Option<Subscription>,
}

impl LocationScreen {
    /// Mount the screen and start following the store
    pub fn mount(store: LocationStore, nav: Arc<dyn NavigationFabric>) -> Self {
        let view = Arc::new(Mutex::new(LocationView::derive(store.get().as_ref())));
        let subscription = {
            let view = Arc::clone(&view);
            store.subscribe(move |location| {
                *view.lock().unwrap_or_else(|p| p.into_inner()) = LocationView::derive(location);
            })
        };
        Self {
            store,
            nav,
            view,
            subscription: Some(subscription),
        }
    }

    #[must_use]
    pub fn view(&self) -> LocationView {
        self.view.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Go pick a different point
    pub fn change(&self) {
        self.nav.push(Route::map());
    }

    pub fn clear(&self) {
        self.store.set(None);
    }

    /// Stop following the store; dropping the screen does the same
    pub fn unmount(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
