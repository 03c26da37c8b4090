// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tracing::debug;
use wl_core::{
    Coordinate, EventKind, Namespace, StationEvent, StationSnapshot, TopicEvent, TransitionKind,
};

use super::property::Property;
use super::reconcile::{attach_or_apply_changes, check_identity, EntitySet, Reconcile};
use super::registry::Registry;
use super::route::LiveRoute;
use super::tracker::{ErrorChannel, Tracked};
use super::vehicle::{decoded, LiveVehicle};
use crate::error::{Error, Result};

/// A station and the vehicles at or approaching it.
pub struct LiveStation {
    id: String,
    registry: Arc<Registry>,
    name: Property<Option<String>>,
    location: Property<Option<Coordinate>>,
    routes: Property<Vec<String>>,
    vehicles: Property<EntitySet<LiveVehicle>>,
    errors: ErrorChannel,
}

impl LiveStation {
    pub(crate) fn new(id: &str, registry: Arc<Registry>) -> Self {
        LiveStation {
            id: id.to_string(),
            registry,
            name: Property::default(),
            location: Property::default(),
            routes: Property::default(),
            vehicles: Property::default(),
            errors: ErrorChannel::new(),
        }
    }

    /// Stop code.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &Property<Option<String>> {
        &self.name
    }

    pub fn location(&self) -> &Property<Option<Coordinate>> {
        &self.location
    }

    /// Short names of the routes serving this station.
    pub fn routes(&self) -> &Property<Vec<String>> {
        &self.routes
    }

    pub fn vehicles(&self) -> &Property<EntitySet<LiveVehicle>> {
        &self.vehicles
    }

    /// Serving routes that are currently held live.
    pub fn serving_routes(&self) -> Vec<Arc<LiveRoute>> {
        self.routes.with(|routes| {
            routes
                .iter()
                .filter_map(|id| self.registry.route(id))
                .collect()
        })
    }

    fn held_vehicle(&self, id: &str) -> Option<Arc<LiveVehicle>> {
        self.vehicles.with(|set| set.get(id).cloned())
    }

    fn record_transition(&self, kind: TransitionKind, vehicle: Arc<LiveVehicle>) {
        let id = vehicle.id().to_string();
        match kind {
            TransitionKind::Approach | TransitionKind::Arrive => self.vehicles.modify(|set| {
                match set.get(&id) {
                    Some(held) if Arc::ptr_eq(held, &vehicle) => false,
                    _ => {
                        set.insert(id, vehicle);
                        true
                    }
                }
            }),
            TransitionKind::Depart => self.vehicles.modify(|set| set.remove(&id).is_some()),
        };
    }
}

impl Reconcile for LiveStation {
    type Snapshot = StationSnapshot;
    const KIND: &'static str = "station";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&self, snapshot: &StationSnapshot) -> Result<()> {
        check_identity(Self::KIND, &self.id, &snapshot.id)?;
        self.name.update(snapshot.name.as_ref());
        self.location.update(snapshot.location.as_ref());
        if let Some(routes) = &snapshot.routes {
            self.routes.set(routes.clone());
        }
        attach_or_apply_changes(&self.vehicles, snapshot.vehicles.as_deref(), &self.registry)
    }

    fn live(registry: &Arc<Registry>, id: &str) -> Arc<Self> {
        registry.station_or_insert(id)
    }
}

impl Tracked for LiveStation {
    fn topic(&self) -> String {
        Namespace::Stations.topic(&self.id)
    }

    fn handle(&self, event: &TopicEvent) -> Result<()> {
        let EventKind::Station { id, event } = &event.kind else {
            return Ok(());
        };
        if *id != self.id {
            return Ok(());
        }
        match event {
            StationEvent::Update(snapshot) => self.apply(decoded(snapshot)?),
            StationEvent::VehicleUpdate(snapshot) => {
                let snapshot = decoded(snapshot)?;
                match self.held_vehicle(&snapshot.id) {
                    Some(vehicle) => vehicle.apply(snapshot),
                    None => {
                        debug!(station = %self.id, vehicle = %snapshot.id, "update for vehicle not at station");
                        Ok(())
                    }
                }
            }
            StationEvent::Transition(kind, transition) => {
                let transition = decoded(transition)?;
                if transition.station != self.id {
                    return Err(Error::StateInconsistency {
                        description: format!(
                            "{} of vehicle {} at station {}",
                            kind.as_str(),
                            transition.vehicle.id,
                            transition.station
                        ),
                        within: format!("station {}", self.id),
                    });
                }
                let vehicle = self
                    .held_vehicle(&transition.vehicle.id)
                    .unwrap_or_else(|| self.registry.vehicle_or_insert(&transition.vehicle.id));
                vehicle.apply(&transition.vehicle)?;
                vehicle.record_transition(*kind, &self.id);
                self.record_transition(*kind, vehicle);
                Ok(())
            }
        }
    }

    fn errors(&self) -> &ErrorChannel {
        &self.errors
    }
}

#[cfg(test)]
#[path = "station_tests.rs"]
mod tests;
