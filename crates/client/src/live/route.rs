// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tracing::{debug, warn};
use wl_core::{reduce, CanonicalRoute, EventKind, Namespace, RouteEvent, RouteSnapshot, TopicEvent};

use super::property::Property;
use super::reconcile::{attach_or_apply_changes, check_identity, EntitySet, Reconcile};
use super::registry::Registry;
use super::station::LiveStation;
use super::tracker::{ErrorChannel, Tracked};
use super::vehicle::{decoded, LiveVehicle};
use crate::error::Result;

/// A route with its stations, vehicles, and canonical stop order.
pub struct LiveRoute {
    id: String,
    registry: Arc<Registry>,
    name: Property<Option<String>>,
    description: Property<Option<String>>,
    color: Property<Option<String>>,
    active: Property<Option<bool>>,
    itinerary: Property<Vec<String>>,
    canonical: Property<CanonicalRoute>,
    stations: Property<EntitySet<LiveStation>>,
    vehicles: Property<EntitySet<LiveVehicle>>,
    errors: ErrorChannel,
}

impl LiveRoute {
    pub(crate) fn new(id: &str, registry: Arc<Registry>) -> Self {
        LiveRoute {
            id: id.to_string(),
            registry,
            name: Property::default(),
            description: Property::default(),
            color: Property::default(),
            active: Property::default(),
            itinerary: Property::default(),
            canonical: Property::default(),
            stations: Property::default(),
            vehicles: Property::default(),
            errors: ErrorChannel::new(),
        }
    }

    /// Route short name.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &Property<Option<String>> {
        &self.name
    }

    pub fn description(&self) -> &Property<Option<String>> {
        &self.description
    }

    pub fn color(&self) -> &Property<Option<String>> {
        &self.color
    }

    pub fn active(&self) -> &Property<Option<bool>> {
        &self.active
    }

    pub fn itinerary(&self) -> &Property<Vec<String>> {
        &self.itinerary
    }

    /// Recomputed whenever the itinerary changes.
    pub fn canonical(&self) -> &Property<CanonicalRoute> {
        &self.canonical
    }

    pub fn stations(&self) -> &Property<EntitySet<LiveStation>> {
        &self.stations
    }

    pub fn vehicles(&self) -> &Property<EntitySet<LiveVehicle>> {
        &self.vehicles
    }

    /// Stations in canonical order, where they are held live.
    ///
    /// Stations held by this route are found directly; others are looked up
    /// in the registry and skipped if nothing holds them.
    pub fn canonical_stations(&self) -> Vec<Arc<LiveStation>> {
        let held = self.stations.get();
        self.canonical.with(|canonical| {
            canonical
                .stations()
                .filter_map(|id| held.get(id).cloned().or_else(|| self.registry.station(id)))
                .collect()
        })
    }

    fn set_itinerary(&self, itinerary: &[String]) {
        let changed = self.itinerary.modify(|current| {
            if current.as_slice() == itinerary {
                false
            } else {
                *current = itinerary.to_vec();
                true
            }
        });
        if !changed {
            return;
        }
        let canonical = reduce(itinerary);
        for conflict in &canonical.conflicts {
            warn!(
                route = %self.id,
                station = %conflict.station,
                index = conflict.index,
                "itinerary contradicts earlier stop order"
            );
        }
        self.canonical.set(canonical);
    }
}

impl Reconcile for LiveRoute {
    type Snapshot = RouteSnapshot;
    const KIND: &'static str = "route";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&self, snapshot: &RouteSnapshot) -> Result<()> {
        check_identity(Self::KIND, &self.id, &snapshot.id)?;
        self.name.update(snapshot.name.as_ref());
        self.description.update(snapshot.description.as_ref());
        self.color.update(snapshot.color.as_ref());
        self.active.update(snapshot.active.as_ref());
        if let Some(itinerary) = &snapshot.itinerary {
            self.set_itinerary(itinerary);
        }
        let stations =
            attach_or_apply_changes(&self.stations, snapshot.stations.as_deref(), &self.registry);
        let vehicles =
            attach_or_apply_changes(&self.vehicles, snapshot.vehicles.as_deref(), &self.registry);
        stations.and(vehicles)
    }

    fn live(registry: &Arc<Registry>, id: &str) -> Arc<Self> {
        registry.route_or_insert(id)
    }
}

impl Tracked for LiveRoute {
    fn topic(&self) -> String {
        Namespace::Routes.topic(&self.id)
    }

    fn handle(&self, event: &TopicEvent) -> Result<()> {
        let EventKind::Route { id, event } = &event.kind else {
            return Ok(());
        };
        if *id != self.id {
            return Ok(());
        }
        match event {
            RouteEvent::Update(snapshot) => self.apply(decoded(snapshot)?),
            RouteEvent::Activate(snapshot) => {
                self.apply(decoded(snapshot)?)?;
                self.active.set(Some(true));
                Ok(())
            }
            RouteEvent::Deactivate => {
                self.active.set(Some(false));
                Ok(())
            }
            RouteEvent::VehicleUpdate(snapshot) => {
                let snapshot = decoded(snapshot)?;
                let held = self.vehicles.with(|set| set.get(&snapshot.id).cloned());
                match held {
                    Some(vehicle) => vehicle.apply(snapshot),
                    None => {
                        debug!(route = %self.id, vehicle = %snapshot.id, "update for vehicle not on route");
                        Ok(())
                    }
                }
            }
        }
    }

    fn errors(&self) -> &ErrorChannel {
        &self.errors
    }
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
