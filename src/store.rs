//! Single source of truth for the selected location
//!
//! Screens hold a clone of the [`LocationStore`] handle, never a copy of the
//! value. Every write synchronously notifies subscribers in subscription order
//! and bumps the store generation.

use crate::models::Location;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

type Listener = Arc<dyn Fn(Option<&Location>) + Send + Sync>;

#[derive(Default)]
struct StoreState {
    location: Option<Location>,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
    generation: u64,
}

/// Shared, observable holder of at most one [`Location`]
#[derive(Clone, Default)]
pub struct LocationStore {
    state: Arc<Mutex<StoreState>>,
}

impl LocationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // A panicking listener never runs under the lock, so the state is intact.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current selection, if any
    #[must_use]
    pub fn get(&self) -> Option<Location> {
        self.lock().location.clone()
    }

    /// Replace or clear the selection and notify every subscriber
    pub fn set(&self, location: Option<Location>) {
        self.write(location, None);
    }

    /// Write only if nothing else wrote since `generation` was observed.
    ///
    /// Returns whether the write happened.
    pub fn set_if_unchanged(&self, generation: u64, location: Option<Location>) -> bool {
        self.write(location, Some(generation))
    }

    /// Counter bumped by every write
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn write(&self, location: Option<Location>, expected: Option<u64>) -> bool {
        let listeners: Vec<Listener> = {
            let mut state = self.lock();
            if expected.is_some_and(|g| g != state.generation) {
                return false;
            }
            state.location = location.clone();
            state.generation += 1;
            state.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };

        match &location {
            Some(loc) => debug!(
                "Location set to {} ({} listeners)",
                loc.coordinate.format_coordinates(),
                listeners.len()
            ),
            None => debug!("Location cleared ({} listeners)", listeners.len()),
        }

        for listener in listeners {
            (*listener)(location.as_ref());
        }
        true
    }

    /// Register a change listener; it stays active while the returned
    /// [`Subscription`] is alive
    #[must_use = "dropping the subscription removes the listener immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(Option<&Location>) + Send + Sync + 'static,
    {
        let mut state = self.lock();
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        state.listeners.push((id, Arc::new(listener)));
        Subscription {
            store: self.clone(),
            id,
        }
    }

    /// Number of active listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

impl std::fmt::Debug for LocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("LocationStore")
            .field("location", &state.location)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

/// Handle returned by [`LocationStore::subscribe`]; the listener is removed
/// when it is dropped
pub struct Subscription {
    store: LocationStore,
    id: u64,
}

impl Subscription {
    /// Remove the listener from the store
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.store.lock().listeners.retain(|(id, _)| *id != self.id);
    }
}
