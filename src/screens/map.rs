//! Map screen controller

use crate::config::MapConfig;
use crate::handoff::HandoffTransport;
use crate::map_sync::{AcquireOutcome, MapSyncController, MapView};
use crate::models::{Coordinate, Location, Region};
use crate::navigation::NavigationFabric;
use crate::position::PositionAcquisition;
use crate::store::LocationStore;
use crate::{FloodcastError, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct MapScreen {
    controller: MapSyncController,
    store: LocationStore,
    nav: Arc<dyn NavigationFabric>,
    transport: HandoffTransport,
}

impl MapScreen {
    pub fn new(
        config: &MapConfig,
        transport: HandoffTransport,
        store: LocationStore,
        acquisition: PositionAcquisition,
        map_view: Arc<dyn MapView>,
        nav: Arc<dyn NavigationFabric>,
    ) -> Result<Self> {
        Ok(Self {
            controller: MapSyncController::new(config, acquisition, map_view)?,
            store,
            nav,
            transport,
        })
    }

    #[must_use]
    pub fn controller(&self) -> &MapSyncController {
        &self.controller
    }

    /// Try to center on the device; the map stays usable either way
    pub async fn open(&self) {
        match self.controller.open().await {
            Ok(AcquireOutcome::Applied(region)) => debug!(
                "Map opened at {}",
                region.center.format_coordinates()
            ),
            Ok(AcquireOutcome::Stale) => {}
            Err(e) => info!("Map opened without device position: {}", e),
        }
    }

    pub fn on_press(&self, point: Coordinate) {
        self.controller.on_press(point);
    }

    pub fn on_region_settle(&self, region: Region) {
        self.controller.on_region_settle(region);
    }

    /// "Center on me"; a denied permission is swallowed
    pub async fn center_on_me(&self) {
        if let Err(e) = self.controller.recenter().await {
            debug!("Center on current location failed: {}", e);
        }
    }

    /// The commit control is enabled only once a region has settled
    #[must_use]
    pub fn can_use_location(&self) -> bool {
        self.controller.region().is_some()
    }

    /// Commit the current pick and hand it to the consuming screen
    pub fn use_location(&self) -> Result<Location> {
        let location = match self.controller.commit_current_pick() {
            Ok(location) => location,
            Err(e @ FloodcastError::NoSelection) => {
                error!("Use location invoked with no pick; the control should be disabled");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        info!(
            "Handing off {} via {:?}",
            location.coordinate.format_coordinates(),
            self.transport
        );
        self.transport
            .send(location.clone(), &self.store, self.nav.as_ref());
        // the map screen has been replaced; nothing it started may land now
        self.controller.teardown();
        Ok(location)
    }

    pub fn teardown(&self) {
        self.controller.teardown();
    }
}
