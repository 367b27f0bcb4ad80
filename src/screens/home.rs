//! Home screen controller
//!
//! Gets the device location on demand and ingests parameter-encoded
//! handoffs from the map screen.

use crate::config::HomeConfig;
use crate::handoff::HandoffReceiver;
use crate::models::Location;
use crate::navigation::{NavigationFabric, Route};
use crate::position::{Accuracy, PositionAcquisition, RequestTokens};
use crate::store::LocationStore;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

/// Short confirmation shown after a handoff was applied
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub shown_at: DateTime<Utc>,
    pub duration: Duration,
}

impl Toast {
    #[must_use]
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        let elapsed = (now - self.shown_at).to_std().unwrap_or_default();
        elapsed < self.duration
    }
}

/// What the primary button does right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    GetLocation,
    ClearLocation,
}

impl PrimaryAction {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::GetLocation => "Get My Location",
            PrimaryAction::ClearLocation => "Clear Location",
        }
    }
}

/// Snapshot of everything the home screen displays
#[derive(Debug, Clone, PartialEq)]
pub struct HomeView {
    pub location: Option<Location>,
    pub loading: bool,
    pub error_message: Option<String>,
    pub toast: Option<String>,
    pub primary_action: PrimaryAction,
}

#[derive(Debug, Default)]
struct HomeState {
    loading: bool,
    error_message: Option<String>,
    toast: Option<Toast>,
}

pub struct HomeScreen {
    store: LocationStore,
    acquisition: PositionAcquisition,
    nav: Arc<dyn NavigationFabric>,
    accuracy: Accuracy,
    toast_duration: Duration,
    tokens: RequestTokens,
    state: Mutex<HomeState>,
    // lives exactly as long as this mount
    handoff: Mutex<HandoffReceiver>,
}

impl HomeScreen {
    pub fn new(
        config: &HomeConfig,
        store: LocationStore,
        acquisition: PositionAcquisition,
        nav: Arc<dyn NavigationFabric>,
    ) -> Self {
        Self {
            store,
            acquisition,
            nav,
            accuracy: config.accuracy,
            toast_duration: config.toast_duration(),
            tokens: RequestTokens::new(),
            state: Mutex::new(HomeState::default()),
            handoff: Mutex::new(HandoffReceiver::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HomeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Render the screen, applying a pending handoff on the first render
    /// that carries one.
    pub fn render(&self) -> HomeView {
        self.render_at(Utc::now())
    }

    pub fn render_at(&self, now: DateTime<Utc>) -> HomeView {
        // claimed under the receiver lock, applied outside it: store listeners
        // run synchronously and may render this screen again
        let pending = self
            .handoff
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .claim(self.nav.as_ref());
        let applied = pending.map(|pending| pending.apply(&self.store, self.nav.as_ref()));
        if applied.is_some() {
            // a fetch still in flight must not overwrite the pick
            self.tokens.invalidate();
        }

        let mut state = self.lock();
        if let Some(location) = applied {
            state.loading = false;
            state.toast = Some(Toast {
                message: format!(
                    "Location selected: {}",
                    location.coordinate.format_coordinates()
                ),
                shown_at: now,
                duration: self.toast_duration,
            });
        }

        let location = self.store.get();
        HomeView {
            primary_action: if location.is_some() {
                PrimaryAction::ClearLocation
            } else {
                PrimaryAction::GetLocation
            },
            location,
            loading: state.loading,
            error_message: state.error_message.clone(),
            toast: state
                .toast
                .as_ref()
                .filter(|t| t.is_visible(now))
                .map(|t| t.message.clone()),
        }
    }

    /// Replace the selection with the device location
    pub async fn get_location(&self) {
        let token = self.tokens.begin();
        {
            let mut state = self.lock();
            state.loading = true;
            state.error_message = None;
        }
        self.store.set(None);
        let generation = self.store.generation();

        let result = self.acquisition.acquire(self.accuracy).await;
        if !self.tokens.is_current(token) {
            debug!("Discarding stale home position result");
            return;
        }

        let error_message = match result {
            Ok(location) => {
                // a pick committed meanwhile wins over the fix
                if !self.store.set_if_unchanged(generation, Some(location)) {
                    debug!("Selection changed while acquiring; discarding home position result");
                }
                None
            }
            Err(e) => Some(e.user_message()),
        };

        let mut state = self.lock();
        state.error_message = error_message;
        state.loading = false;
    }

    pub fn clear_location(&self) {
        self.tokens.invalidate();
        self.store.set(None);
        let mut state = self.lock();
        state.error_message = None;
        state.loading = false;
    }

    /// Clear when something is selected, otherwise fetch the device location
    pub async fn primary_action(&self) {
        if self.store.get().is_some() {
            self.clear_location();
        } else {
            self.get_location().await;
        }
    }

    pub fn open_map(&self) {
        self.nav.push(Route::map());
    }

    /// Discard any acquisition still in flight
    pub fn teardown(&self) {
        self.tokens.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::{LAT_PARAM, LNG_PARAM};
    use crate::models::Coordinate;
    use crate::navigation::{MemoryNavigator, RoutePath};
    use crate::platform::{ScriptedPermission, ScriptedPosition};
    use crate::position::PermissionStatus;
    use tokio::sync::Notify;

    fn screen(
        permission: PermissionStatus,
        position: ScriptedPosition,
        nav: Arc<MemoryNavigator>,
    ) -> (HomeScreen, LocationStore) {
        let store = LocationStore::new();
        let acquisition = PositionAcquisition::new(
            Arc::new(ScriptedPermission::new(permission)),
            Arc::new(position),
        );
        let home = HomeScreen::new(&HomeConfig::default(), store.clone(), acquisition, nav);
        (home, store)
    }

    #[tokio::test]
    async fn test_get_location_success() {
        let nav = Arc::new(MemoryNavigator::default());
        let (home, store) = screen(
            PermissionStatus::Granted,
            ScriptedPosition::fix(46.8182, 8.2275, Some(3.0)),
            nav,
        );

        home.get_location().await;
        let view = home.render();
        assert!(!view.loading);
        assert!(view.error_message.is_none());
        assert_eq!(view.primary_action, PrimaryAction::ClearLocation);
        assert_eq!(
            store.get().map(|l| l.coordinate),
            Some(Coordinate::new(46.8182, 8.2275).unwrap())
        );
    }

    #[tokio::test]
    async fn test_get_location_denied() {
        let nav = Arc::new(MemoryNavigator::default());
        let (home, store) = screen(
            PermissionStatus::Denied,
            ScriptedPosition::fix(1.0, 2.0, None),
            nav,
        );
        store.set(Some(Location::at(Coordinate::new(5.0, 5.0).unwrap())));

        home.get_location().await;
        let view = home.render();
        assert_eq!(
            view.error_message.as_deref(),
            Some("Permission to access location was denied.")
        );
        assert!(!view.loading);
        // the previous selection is cleared when a fetch starts
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn test_get_location_unavailable() {
        let nav = Arc::new(MemoryNavigator::default());
        let (home, _store) = screen(
            PermissionStatus::Granted,
            ScriptedPosition::failure("no gps"),
            nav,
        );
        home.get_location().await;
        assert_eq!(
            home.render().error_message.as_deref(),
            Some("Failed to get location")
        );
    }

    #[tokio::test]
    async fn test_primary_action_toggles() {
        let nav = Arc::new(MemoryNavigator::default());
        let (home, store) = screen(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None),
            nav,
        );
        assert_eq!(home.render().primary_action.label(), "Get My Location");

        home.primary_action().await;
        assert!(store.get().is_some());
        assert_eq!(home.render().primary_action.label(), "Clear Location");

        home.primary_action().await;
        assert!(store.get().is_none());
    }

    #[tokio::test]
    async fn test_teardown_discards_in_flight_result() {
        let gate = Arc::new(Notify::new());
        let nav = Arc::new(MemoryNavigator::default());
        let (home, store) = screen(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None).gated(gate.clone()),
            nav,
        );

        let interrupt = async {
            home.teardown();
            gate.notify_one();
        };
        futures::join!(home.get_location(), interrupt);

        assert!(store.get().is_none());
    }

    #[test]
    fn test_render_ingests_handoff_once_and_shows_toast() {
        let nav = Arc::new(MemoryNavigator::new(
            Route::home()
                .with_param(LAT_PARAM, "37.78825")
                .with_param(LNG_PARAM, "-122.4324"),
        ));
        let (home, store) = screen(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None),
            nav.clone(),
        );

        let now = Utc::now();
        let view = home.render_at(now);
        assert_eq!(
            view.toast.as_deref(),
            Some("Location selected: 37.7882, -122.4324")
        );
        assert_eq!(nav.current_route(), Route::new(RoutePath::Home));
        assert!(store.get().is_some());

        let later = now + chrono::Duration::milliseconds(3500);
        assert!(home.render_at(later).toast.is_none());
    }

    #[test]
    fn test_open_map_pushes_route() {
        let nav = Arc::new(MemoryNavigator::default());
        let (home, _store) = screen(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None),
            nav.clone(),
        );
        home.open_map();
        assert_eq!(nav.current_route().path, RoutePath::Map);
        assert_eq!(nav.depth(), 2);
    }

    #[tokio::test]
    async fn test_handoff_during_fetch_is_not_overwritten() {
        let gate = Arc::new(Notify::new());
        let nav = Arc::new(MemoryNavigator::default());
        let (home, store) = screen(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None).gated(gate.clone()),
            nav.clone(),
        );

        let pick_on_map = async {
            assert!(home.render().loading);
            nav.replace(
                Route::home()
                    .with_param(LAT_PARAM, "10")
                    .with_param(LNG_PARAM, "20"),
            );
            let view = home.render();
            assert!(!view.loading);
            assert!(view.toast.is_some());
            gate.notify_one();
        };
        futures::join!(home.get_location(), pick_on_map);

        assert_eq!(
            store.get().map(|l| l.coordinate),
            Some(Coordinate::new(10.0, 20.0).unwrap())
        );
        assert!(!home.render().loading);
    }

    #[test]
    fn test_listener_may_render_during_handoff() {
        let nav = Arc::new(MemoryNavigator::new(
            Route::home()
                .with_param(LAT_PARAM, "10")
                .with_param(LNG_PARAM, "20"),
        ));
        let (home, store) = screen(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None),
            nav,
        );
        let home = Arc::new(home);
        let rendered = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let home = Arc::downgrade(&home);
            let rendered = Arc::clone(&rendered);
            store.subscribe(move |_| {
                if let Some(home) = home.upgrade() {
                    rendered.lock().unwrap().push(home.render().location);
                }
            })
        };

        let view = home.render();
        assert!(view.toast.is_some());
        let rendered = rendered.lock().unwrap();
        assert_eq!(rendered.len(), 1);
        assert_eq!(
            rendered[0].as_ref().map(|l| l.coordinate),
            Some(Coordinate::new(10.0, 20.0).unwrap())
        );
    }
}
