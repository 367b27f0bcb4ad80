use anyhow::{Context, Result, bail};
use floodcast::config::FloodcastConfig;
use floodcast::logging;
use floodcast::platform::{RecordingMapView, ScriptedPermission, ScriptedPosition};
use floodcast::position::PermissionStatus;
use floodcast::screens::{HomeScreen, LocationScreen, MapScreen};
use floodcast::{Coordinate, LocationStore, MemoryNavigator, NavigationFabric, PositionAcquisition, Region, RoutePath};
use std::sync::Arc;

fn parse_pick(args: &[String]) -> Result<Option<Coordinate>> {
    match args {
        [] => Ok(None),
        [lat, lng] => {
            let lat: f64 = lat.parse().with_context(|| format!("Invalid latitude '{lat}'"))?;
            let lng: f64 = lng.parse().with_context(|| format!("Invalid longitude '{lng}'"))?;
            Ok(Some(Coordinate::new(lat, lng)?))
        }
        _ => bail!("usage: floodcast [LAT LNG]"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = FloodcastConfig::load()?;
    logging::init(&config.logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let pick = parse_pick(&args)?;

    // Headless device: permission granted, fix at the fallback center
    let fallback = config.map.fallback_region()?;
    let acquisition = PositionAcquisition::new(
        Arc::new(ScriptedPermission::new(PermissionStatus::Granted)),
        Arc::new(ScriptedPosition::fix(
            fallback.center.latitude(),
            fallback.center.longitude(),
            Some(5.0),
        )),
    );

    let store = LocationStore::new();
    let nav = Arc::new(MemoryNavigator::default());
    let home = HomeScreen::new(&config.home, store.clone(), acquisition.clone(), nav.clone());

    match pick {
        Some(coordinate) => {
            home.open_map();
            let map = MapScreen::new(
                &config.map,
                config.handoff.transport,
                store.clone(),
                acquisition.clone(),
                Arc::new(RecordingMapView::new()),
                nav.clone(),
            )?;
            map.open().await;
            map.on_press(coordinate);
            map.on_region_settle(Region::around(coordinate, config.map.pick_span));
            map.use_location()?;

            if nav.current_route().path == RoutePath::Home {
                // fresh mount of the landing screen ingests the parameters
                let landing =
                    HomeScreen::new(&config.home, store.clone(), acquisition, nav.clone());
                if let Some(toast) = landing.render().toast {
                    println!("{toast}");
                }
            }
        }
        None => {
            home.get_location().await;
            if let Some(message) = home.render().error_message {
                bail!(message);
            }
        }
    }

    let screen = LocationScreen::mount(store, nav);
    for line in screen.view().lines() {
        println!("{line}");
    }
    screen.unmount();

    Ok(())
}
