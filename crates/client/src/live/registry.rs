// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier-keyed registry of live entities.
//!
//! The registry holds weak references only: an entity stays registered
//! while something else owns it, and a later lookup of the same identifier
//! returns the same object. Once the last owner drops it, the next request
//! creates a fresh one.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::route::LiveRoute;
use super::station::LiveStation;
use super::vehicle::LiveVehicle;

pub struct Registry {
    routes: Arena<LiveRoute>,
    stations: Arena<LiveStation>,
    vehicles: Arena<LiveVehicle>,
}

struct Arena<T> {
    entries: Mutex<HashMap<String, Weak<T>>>,
}

impl<T> Arena<T> {
    fn new() -> Self {
        Arena {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn get(&self, id: &str) -> Option<Arc<T>> {
        self.entries.lock().get(id).and_then(Weak::upgrade)
    }

    fn get_or_insert_with(&self, id: &str, make: impl FnOnce() -> T) -> Arc<T> {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(id).and_then(Weak::upgrade) {
            return existing;
        }
        entries.retain(|_, entry| entry.strong_count() > 0);
        let entity = Arc::new(make());
        entries.insert(id.to_string(), Arc::downgrade(&entity));
        entity
    }

    fn live(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }
}

impl Registry {
    pub fn new() -> Arc<Self> {
        Arc::new(Registry {
            routes: Arena::new(),
            stations: Arena::new(),
            vehicles: Arena::new(),
        })
    }

    pub fn route(&self, id: &str) -> Option<Arc<LiveRoute>> {
        self.routes.get(id)
    }

    pub fn station(&self, id: &str) -> Option<Arc<LiveStation>> {
        self.stations.get(id)
    }

    pub fn vehicle(&self, id: &str) -> Option<Arc<LiveVehicle>> {
        self.vehicles.get(id)
    }

    /// The live route for `id`, created empty if none is held.
    pub fn route_or_insert(self: &Arc<Self>, id: &str) -> Arc<LiveRoute> {
        self.routes
            .get_or_insert_with(id, || LiveRoute::new(id, Arc::clone(self)))
    }

    pub fn station_or_insert(self: &Arc<Self>, id: &str) -> Arc<LiveStation> {
        self.stations
            .get_or_insert_with(id, || LiveStation::new(id, Arc::clone(self)))
    }

    pub fn vehicle_or_insert(self: &Arc<Self>, id: &str) -> Arc<LiveVehicle> {
        self.vehicles
            .get_or_insert_with(id, || LiveVehicle::new(id, Arc::clone(self)))
    }

    /// Counts of live routes, stations, and vehicles.
    pub fn live_counts(&self) -> (usize, usize, usize) {
        (self.routes.live(), self.stations.live(), self.vehicles.live())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
