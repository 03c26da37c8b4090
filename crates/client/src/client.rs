// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The client facade: one connection, one entity registry.
//!
//! A [`Client`] hands out live entities by identifier, starts trackers that
//! keep them current, and runs the agency-wide listing and schedule calls.
//! Listings are reconciled through the registry, so an entity returned by a
//! listing is the same object a watcher of that identifier already holds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use wl_core::{
    Coordinate, EventKind, Kwargs, Listing, Procedures, ScheduleResult, ScheduledVisit, Snapshot,
    Value,
};

use crate::config::{AgencyConfig, ClientConfig};
use crate::connection::{Connection, ConnectionPool};
use crate::error::{Error, Result};
use crate::live::{track, LiveRoute, LiveStation, LiveVehicle, Reconcile, Registry, Tracker};

pub struct Client {
    connection: Arc<Connection>,
    registry: Arc<Registry>,
    agency: AgencyConfig,
}

impl Client {
    pub fn new(connection: Arc<Connection>, agency: AgencyConfig) -> Self {
        Client {
            connection,
            registry: Registry::new(),
            agency,
        }
    }

    /// Connect through `pool` to the server named by `config`.
    pub fn connect(pool: &ConnectionPool, config: &ClientConfig) -> Self {
        Self::new(pool.connect(&config.endpoint()), config.agency.clone())
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn agency(&self) -> &AgencyConfig {
        &self.agency
    }

    pub fn route(&self, id: &str) -> Arc<LiveRoute> {
        self.registry.route_or_insert(id)
    }

    pub fn station(&self, id: &str) -> Arc<LiveStation> {
        self.registry.station_or_insert(id)
    }

    pub fn vehicle(&self, id: &str) -> Arc<LiveVehicle> {
        self.registry.vehicle_or_insert(id)
    }

    /// The live route for `id` and a tracker keeping it current.
    pub fn watch_route(&self, id: &str) -> (Arc<LiveRoute>, Tracker) {
        let route = self.route(id);
        let tracker = track(Arc::clone(&route), Arc::clone(&self.connection));
        (route, tracker)
    }

    pub fn watch_station(&self, id: &str) -> (Arc<LiveStation>, Tracker) {
        let station = self.station(id);
        let tracker = track(Arc::clone(&station), Arc::clone(&self.connection));
        (station, tracker)
    }

    pub fn watch_vehicle(&self, id: &str) -> (Arc<LiveVehicle>, Tracker) {
        let vehicle = self.vehicle(id);
        let tracker = track(Arc::clone(&vehicle), Arc::clone(&self.connection));
        (vehicle, tracker)
    }

    /// Every route of the agency.
    pub async fn routes(&self) -> Result<Vec<Arc<LiveRoute>>> {
        match self.listing(Procedures::AGENCY_ROUTES).await? {
            Listing::Routes(snapshots) => self.reconcile::<LiveRoute>(&snapshots?),
            _ => Err(unexpected_reply(Procedures::AGENCY_ROUTES)),
        }
    }

    /// Every station of the agency.
    pub async fn stations(&self) -> Result<Vec<Arc<LiveStation>>> {
        match self.listing(Procedures::AGENCY_STATIONS).await? {
            Listing::Stations(snapshots) => self.reconcile::<LiveStation>(&snapshots?),
            _ => Err(unexpected_reply(Procedures::AGENCY_STATIONS)),
        }
    }

    /// Every vehicle of the agency.
    pub async fn vehicles(&self) -> Result<Vec<Arc<LiveVehicle>>> {
        match self.listing(Procedures::AGENCY_VEHICLES).await? {
            Listing::Vehicles(snapshots) => self.reconcile::<LiveVehicle>(&snapshots?),
            _ => Err(unexpected_reply(Procedures::AGENCY_VEHICLES)),
        }
    }

    /// Stations within the agency search radius of `here`, nearest first,
    /// with their distance in meters.
    pub async fn stations_near(&self, here: Coordinate) -> Result<Vec<(Arc<LiveStation>, f64)>> {
        let radius = f64::from(self.agency.search_radius_m);
        let mut nearby: Vec<_> = self
            .stations()
            .await?
            .into_iter()
            .filter_map(|station| {
                let distance = station.location().get()?.distance_m(&here);
                (distance <= radius).then_some((station, distance))
            })
            .collect();
        nearby.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(nearby)
    }

    /// The next visit of `station`, if one is scheduled.
    pub async fn next_visit(&self, station: &str) -> Result<Option<ScheduledVisit>> {
        let args = vec![Value::from(station), Value::from(self.now())];
        match self.schedule("next_visit", args).await? {
            ScheduleResult::Visit(visit) => Ok(visit?),
            ScheduleResult::Visits(_) => Err(unexpected_reply("next_visit")),
        }
    }

    /// Up to `limit` upcoming visits of `station`.
    pub async fn next_visits(&self, station: &str, limit: u32) -> Result<Vec<ScheduledVisit>> {
        let args = vec![
            Value::from(station),
            Value::from(self.now()),
            Value::from(i64::from(limit)),
        ];
        match self.schedule("next_visits", args).await? {
            ScheduleResult::Visits(visits) => Ok(visits?),
            ScheduleResult::Visit(_) => Err(unexpected_reply("next_visits")),
        }
    }

    /// Close the connection. Trackers started by this client end with it.
    pub fn close(&self) {
        self.connection.close();
    }

    fn now(&self) -> i64 {
        schedule_time(Utc::now(), self.agency.time_resolution_secs)
    }

    async fn listing(&self, procedure: &str) -> Result<Listing> {
        let event = self.connection.call(procedure, Vec::new(), Kwargs::new()).await?;
        match event.map(|e| e.kind) {
            Some(EventKind::Listing(listing)) => Ok(listing),
            _ => Err(unexpected_reply(procedure)),
        }
    }

    async fn schedule(&self, name: &str, args: Vec<Value>) -> Result<ScheduleResult> {
        let procedure = Procedures::schedule(&self.connection.endpoint().schedule_service, name);
        debug!(procedure, "schedule lookup");
        let event = self.connection.call(&procedure, args, Kwargs::new()).await?;
        match event.map(|e| e.kind) {
            Some(EventKind::Schedule(result)) => Ok(result),
            _ => Err(unexpected_reply(&procedure)),
        }
    }

    /// Apply every snapshot to its registered entity. All are applied; the
    /// first failure is returned.
    fn reconcile<L: Reconcile>(&self, snapshots: &[L::Snapshot]) -> Result<Vec<Arc<L>>> {
        let mut first_error = None;
        let entities: Vec<Arc<L>> = snapshots
            .iter()
            .map(|snapshot| {
                let entity = L::live(&self.registry, snapshot.id());
                if let Err(e) = entity.apply(snapshot) {
                    first_error.get_or_insert(e);
                }
                entity
            })
            .collect();
        first_error.map_or(Ok(entities), Err)
    }
}

/// `now` in unix seconds, rounded down to `resolution_secs`.
///
/// Lookups within one resolution window send identical arguments.
pub fn schedule_time(now: DateTime<Utc>, resolution_secs: u64) -> i64 {
    let resolution = i64::try_from(resolution_secs).unwrap_or(i64::MAX).max(1);
    let secs = now.timestamp();
    secs - secs.rem_euclid(resolution)
}

fn unexpected_reply(procedure: &str) -> Error {
    Error::StateInconsistency {
        description: "unexpected reply".to_string(),
        within: procedure.to_string(),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
