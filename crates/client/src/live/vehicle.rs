// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use wl_core::{
    Coordinate, EventKind, Namespace, TopicEvent, TransitionKind, VehicleEvent, VehicleSnapshot,
};

use super::property::Property;
use super::reconcile::{check_identity, Reconcile};
use super::registry::Registry;
use super::station::LiveStation;
use super::tracker::{ErrorChannel, Tracked};
use crate::error::{Error, Result};

/// A vehicle kept current by snapshots and events.
pub struct LiveVehicle {
    id: String,
    registry: Arc<Registry>,
    capacity: Property<Option<u32>>,
    location: Property<Option<Coordinate>>,
    heading: Property<Option<f64>>,
    route: Property<Option<String>>,
    station: Property<Option<String>>,
    next_station: Property<Option<String>>,
    active: Property<Option<bool>>,
    errors: ErrorChannel,
}

impl LiveVehicle {
    pub(crate) fn new(id: &str, registry: Arc<Registry>) -> Self {
        LiveVehicle {
            id: id.to_string(),
            registry,
            capacity: Property::default(),
            location: Property::default(),
            heading: Property::default(),
            route: Property::default(),
            station: Property::default(),
            next_station: Property::default(),
            active: Property::default(),
            errors: ErrorChannel::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capacity(&self) -> &Property<Option<u32>> {
        &self.capacity
    }

    pub fn location(&self) -> &Property<Option<Coordinate>> {
        &self.location
    }

    pub fn heading(&self) -> &Property<Option<f64>> {
        &self.heading
    }

    /// Short name of the route being served.
    pub fn route(&self) -> &Property<Option<String>> {
        &self.route
    }

    /// Stop code of the station the vehicle is at or last departed.
    pub fn station(&self) -> &Property<Option<String>> {
        &self.station
    }

    /// Stop code of the station the vehicle is heading to.
    pub fn next_station(&self) -> &Property<Option<String>> {
        &self.next_station
    }

    pub fn active(&self) -> &Property<Option<bool>> {
        &self.active
    }

    /// The live station the vehicle is at, if anything holds it.
    pub fn current_station(&self) -> Option<Arc<LiveStation>> {
        let id = self.station.get()?;
        self.registry.station(&id)
    }

    /// Record a move relative to `station`.
    pub fn record_transition(&self, kind: TransitionKind, station: &str) {
        match kind {
            TransitionKind::Approach => {
                self.next_station.set(Some(station.to_string()));
            }
            TransitionKind::Arrive => {
                self.station.set(Some(station.to_string()));
                self.next_station.modify(|next| {
                    let reached = next.as_deref() == Some(station);
                    if reached {
                        *next = None;
                    }
                    reached
                });
            }
            TransitionKind::Depart => {
                self.station.set(Some(station.to_string()));
            }
        }
    }
}

impl Reconcile for LiveVehicle {
    type Snapshot = VehicleSnapshot;
    const KIND: &'static str = "vehicle";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&self, snapshot: &VehicleSnapshot) -> Result<()> {
        check_identity(Self::KIND, &self.id, &snapshot.id)?;
        self.capacity.update(snapshot.capacity.as_ref());
        self.location.update(snapshot.location.as_ref());
        self.heading.update(snapshot.heading.as_ref());
        self.route.update(snapshot.route.as_ref());
        self.station.update(snapshot.station.as_ref());
        self.next_station.update(snapshot.next_station.as_ref());
        self.active.update(snapshot.active.as_ref());
        Ok(())
    }

    fn live(registry: &Arc<Registry>, id: &str) -> Arc<Self> {
        registry.vehicle_or_insert(id)
    }
}

impl Tracked for LiveVehicle {
    fn topic(&self) -> String {
        Namespace::Vehicles.topic(&self.id)
    }

    fn handle(&self, event: &TopicEvent) -> Result<()> {
        let EventKind::Vehicle { id, event } = &event.kind else {
            return Ok(());
        };
        if *id != self.id {
            return Ok(());
        }
        match event {
            VehicleEvent::Update(snapshot) => self.apply(decoded(snapshot)?),
            VehicleEvent::Activate(snapshot) => {
                self.apply(decoded(snapshot)?)?;
                self.active.set(Some(true));
                Ok(())
            }
            VehicleEvent::Deactivate => {
                self.active.set(Some(false));
                Ok(())
            }
            VehicleEvent::Transition(kind, transition) => {
                let transition = decoded(transition)?;
                self.apply(&transition.vehicle)?;
                self.record_transition(*kind, &transition.station);
                Ok(())
            }
        }
    }

    fn errors(&self) -> &ErrorChannel {
        &self.errors
    }
}

/// Surface a payload decode failure as a client error.
pub(crate) fn decoded<T>(payload: &wl_core::Decoded<T>) -> Result<&T> {
    payload.as_ref().map_err(|e| Error::EventDecode(e.clone()))
}

#[cfg(test)]
#[path = "vehicle_tests.rs"]
mod tests;
