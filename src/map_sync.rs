//! Map region / marker reconciliation
//!
//! The controller keeps the visible region and the point marker congruent:
//! after every region settle the marker sits on the region center. A tap
//! moves the marker immediately and asks the map to glide there; the region
//! only changes once that movement settles.

use crate::config::MapConfig;
use crate::models::{Coordinate, Location, Region};
use crate::position::{Accuracy, PositionAcquisition, RequestTokens};
use crate::{FloodcastError, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Rendering side of the map; commands are fire-and-forget
pub trait MapView: Send + Sync {
    fn animate_to(&self, region: Region, duration: Duration);
}

/// Result of an acquisition started by the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AcquireOutcome {
    /// The fix was applied and the map asked to move there
    Applied(Region),
    /// A newer request or teardown superseded this one; nothing was written
    Stale,
}

#[derive(Debug, Default)]
struct MapState {
    region: Option<Region>,
    marker: Option<Coordinate>,
    unsettled_tap: Option<Coordinate>,
}

pub struct MapSyncController {
    state: Mutex<MapState>,
    tokens: RequestTokens,
    acquisition: PositionAcquisition,
    map_view: Arc<dyn MapView>,
    accuracy: Accuracy,
    pick_span: f64,
    fallback_region: Region,
    open_animation: Duration,
    tap_animation: Duration,
    recenter_animation: Duration,
}

impl MapSyncController {
    pub fn new(
        config: &MapConfig,
        acquisition: PositionAcquisition,
        map_view: Arc<dyn MapView>,
    ) -> Result<Self> {
        Ok(Self {
            state: Mutex::new(MapState::default()),
            tokens: RequestTokens::new(),
            acquisition,
            map_view,
            accuracy: config.accuracy,
            pick_span: config.pick_span,
            fallback_region: config.fallback_region()?,
            open_animation: config.open_animation(),
            tap_animation: config.tap_animation(),
            recenter_animation: config.recenter_animation(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, MapState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Center the map on the device position when it first opens.
    ///
    /// On failure region and marker stay absent and the viewport keeps the
    /// fallback region.
    pub async fn open(&self) -> Result<AcquireOutcome> {
        self.move_to_device_position(self.open_animation).await
    }

    /// Explicit "center on me" request
    pub async fn recenter(&self) -> Result<AcquireOutcome> {
        self.move_to_device_position(self.recenter_animation).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn move_to_device_position(&self, animation: Duration) -> Result<AcquireOutcome> {
        let token = self.tokens.begin();
        let location = self.acquisition.acquire(self.accuracy).await?;

        if !self.tokens.is_current(token) {
            debug!("Discarding stale map position result");
            return Ok(AcquireOutcome::Stale);
        }

        let region = Region::around(location.coordinate, self.pick_span);
        {
            let mut state = self.lock();
            state.region = Some(region);
            state.marker = Some(location.coordinate);
            state.unsettled_tap = None;
        }
        info!(
            "Map centered on device position {}",
            location.coordinate.format_coordinates()
        );
        self.map_view.animate_to(region, animation);
        Ok(AcquireOutcome::Applied(region))
    }

    /// User pressed a point on the map
    pub fn on_press(&self, point: Coordinate) {
        {
            let mut state = self.lock();
            state.marker = Some(point);
            state.unsettled_tap = Some(point);
        }
        debug!("Map tapped at {}", point.format_coordinates());
        self.map_view
            .animate_to(Region::around(point, self.pick_span), self.tap_animation);
    }

    /// The map finished moving, programmatically or by a user pan
    pub fn on_region_settle(&self, region: Region) {
        let mut state = self.lock();
        state.region = Some(region);
        state.marker = Some(region.center);
        state.unsettled_tap = None;
    }

    /// Turn the current pick into a location without clearing it.
    ///
    /// Prefers the region center and falls back to the marker.
    pub fn commit_current_pick(&self) -> Result<Location> {
        let state = self.lock();
        let coordinate = state
            .region
            .map(|r| r.center)
            .or(state.marker)
            .ok_or(FloodcastError::NoSelection)?;
        Ok(Location::at(coordinate))
    }

    #[must_use]
    pub fn region(&self) -> Option<Region> {
        self.lock().region
    }

    #[must_use]
    pub fn marker(&self) -> Option<Coordinate> {
        self.lock().marker
    }

    /// A tap whose map movement has not settled yet
    #[must_use]
    pub fn unsettled_tap(&self) -> Option<Coordinate> {
        self.lock().unsettled_tap
    }

    /// Region the map should render: the current one, else the fallback
    #[must_use]
    pub fn initial_region(&self) -> Region {
        self.lock().region.unwrap_or(self.fallback_region)
    }

    /// Drop every acquisition still in flight
    pub fn teardown(&self) {
        self.tokens.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{RecordingMapView, ScriptedPermission, ScriptedPosition};
    use crate::position::PermissionStatus;
    use tokio::sync::Notify;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn controller(
        permission: PermissionStatus,
        position: ScriptedPosition,
    ) -> (MapSyncController, Arc<RecordingMapView>) {
        let view = Arc::new(RecordingMapView::new());
        let acquisition = PositionAcquisition::new(
            Arc::new(ScriptedPermission::new(permission)),
            Arc::new(position),
        );
        let ctrl = MapSyncController::new(&MapConfig::default(), acquisition, view.clone()).unwrap();
        (ctrl, view)
    }

    #[tokio::test]
    async fn test_open_centers_on_device_position() {
        let (ctrl, view) = controller(
            PermissionStatus::Granted,
            ScriptedPosition::fix(46.8182, 8.2275, None),
        );

        let outcome = ctrl.open().await.unwrap();
        let expected = Region::around(coord(46.8182, 8.2275), 0.01);
        assert_eq!(outcome, AcquireOutcome::Applied(expected));
        assert_eq!(ctrl.region(), Some(expected));
        assert_eq!(ctrl.marker(), Some(coord(46.8182, 8.2275)));
        assert_eq!(
            view.last_animation(),
            Some((expected, Duration::from_millis(500)))
        );
    }

    #[tokio::test]
    async fn test_open_denied_leaves_fallback() {
        let (ctrl, view) = controller(
            PermissionStatus::Denied,
            ScriptedPosition::fix(1.0, 2.0, None),
        );

        let err = ctrl.open().await.unwrap_err();
        assert!(matches!(err, FloodcastError::PermissionDenied));
        assert!(ctrl.region().is_none());
        assert!(ctrl.marker().is_none());
        assert!(view.animations().is_empty());
        assert_eq!(ctrl.initial_region().center, coord(37.78825, -122.4324));
    }

    #[test]
    fn test_tap_moves_marker_not_region() {
        let (ctrl, view) = controller(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None),
        );
        let settled = Region::around(coord(5.0, 5.0), 0.01);
        ctrl.on_region_settle(settled);

        ctrl.on_press(coord(10.0, 20.0));
        assert_eq!(ctrl.marker(), Some(coord(10.0, 20.0)));
        assert_eq!(ctrl.region(), Some(settled));
        assert_eq!(ctrl.unsettled_tap(), Some(coord(10.0, 20.0)));
        assert_eq!(
            view.last_animation(),
            Some((
                Region::around(coord(10.0, 20.0), 0.01),
                Duration::from_millis(300)
            ))
        );
    }

    #[test]
    fn test_settle_after_tap_wins() {
        let (ctrl, _view) = controller(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None),
        );
        ctrl.on_press(coord(10.0, 20.0));
        let settled = Region::new(coord(11.0, 21.0), 0.02, 0.03).unwrap();
        ctrl.on_region_settle(settled);

        assert_eq!(ctrl.marker(), Some(settled.center));
        assert!(ctrl.unsettled_tap().is_none());
        let committed = ctrl.commit_current_pick().unwrap();
        assert_eq!(committed.coordinate, coord(11.0, 21.0));
    }

    #[test]
    fn test_commit_falls_back_to_marker() {
        let (ctrl, _view) = controller(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None),
        );
        ctrl.on_press(coord(-3.0, 4.0));
        let committed = ctrl.commit_current_pick().unwrap();
        assert_eq!(committed.coordinate, coord(-3.0, 4.0));
        assert!(committed.accuracy.is_none());
    }

    #[test]
    fn test_commit_without_selection() {
        let (ctrl, _view) = controller(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None),
        );
        assert!(matches!(
            ctrl.commit_current_pick(),
            Err(FloodcastError::NoSelection)
        ));
    }

    #[test]
    fn test_commit_keeps_pick() {
        let (ctrl, _view) = controller(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None),
        );
        let settled = Region::around(coord(7.0, 8.0), 0.01);
        ctrl.on_region_settle(settled);
        ctrl.commit_current_pick().unwrap();
        assert_eq!(ctrl.region(), Some(settled));
        assert_eq!(ctrl.marker(), Some(settled.center));
    }

    #[tokio::test]
    async fn test_result_after_teardown_is_discarded() {
        let gate = Arc::new(Notify::new());
        let (ctrl, view) = controller(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None).gated(gate.clone()),
        );

        let interrupt = async {
            ctrl.teardown();
            gate.notify_one();
        };
        let (outcome, ()) = futures::join!(ctrl.open(), interrupt);

        assert_eq!(outcome.unwrap(), AcquireOutcome::Stale);
        assert!(ctrl.region().is_none());
        assert!(view.animations().is_empty());
    }

    #[tokio::test]
    async fn test_recenter_uses_its_own_animation() {
        let (ctrl, view) = controller(
            PermissionStatus::Granted,
            ScriptedPosition::fix(1.0, 2.0, None),
        );
        ctrl.on_region_settle(Region::around(coord(50.0, 50.0), 1.0));
        ctrl.recenter().await.unwrap();
        assert_eq!(ctrl.marker(), Some(coord(1.0, 2.0)));
        assert_eq!(
            view.last_animation().map(|(_, d)| d),
            Some(Duration::from_millis(400))
        );
    }
}
