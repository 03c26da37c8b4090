// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Follow one live entity, printing every attribute change.

use futures_util::future::{select_all, BoxFuture};
use tokio::sync::{broadcast, watch};
use wl_client::live::EntitySet;
use wl_client::{ClientConfig, LiveRoute, LiveStation, LiveVehicle, Property, Tracked, Tracker};
use wl_core::{CanonicalRoute, Coordinate};

use super::with_client;
use crate::cli::EntityKind;
use crate::error::{Error, Result};

pub fn run(config: &ClientConfig, kind: EntityKind, id: &str) -> Result<()> {
    with_client(config, |client| async move {
        match kind {
            EntityKind::Route => {
                let (route, tracker) = client.watch_route(id);
                follow(route_fields(&route), route.errors().subscribe(), tracker).await
            }
            EntityKind::Station => {
                let (station, tracker) = client.watch_station(id);
                follow(station_fields(&station), station.errors().subscribe(), tracker).await
            }
            EntityKind::Vehicle => {
                let (vehicle, tracker) = client.watch_vehicle(id);
                follow(vehicle_fields(&vehicle), vehicle.errors().subscribe(), tracker).await
            }
        }
        Ok::<_, Error>(())
    })
}

/// One observed attribute.
pub trait Field: Send {
    /// Resolves `false` once the entity is gone.
    fn changed(&mut self) -> BoxFuture<'_, bool>;

    /// `label: value`, marking the value seen.
    fn render(&mut self) -> String;
}

struct Watched<T> {
    label: &'static str,
    receiver: watch::Receiver<T>,
    show: fn(&T) -> String,
}

impl<T: Send + Sync + 'static> Field for Watched<T> {
    fn changed(&mut self) -> BoxFuture<'_, bool> {
        Box::pin(async move { self.receiver.changed().await.is_ok() })
    }

    fn render(&mut self) -> String {
        let value = (self.show)(&self.receiver.borrow_and_update());
        format!("{}: {}", self.label, value)
    }
}

fn field<T: Send + Sync + 'static>(
    label: &'static str,
    property: &Property<T>,
    show: fn(&T) -> String,
) -> Box<dyn Field> {
    Box::new(Watched {
        label,
        receiver: property.watch(),
        show,
    })
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

fn flag(value: &Option<bool>) -> String {
    match value {
        Some(true) => "yes".to_string(),
        Some(false) => "no".to_string(),
        None => "-".to_string(),
    }
}

fn number<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map_or_else(|| "-".to_string(), T::to_string)
}

fn position(value: &Option<Coordinate>) -> String {
    value.map_or_else(|| "-".to_string(), |c| format!("{:.5}, {:.5}", c.lat, c.lon))
}

#[allow(clippy::ptr_arg)]
fn list(values: &Vec<String>) -> String {
    values.join(" ")
}

fn members<L>(set: &EntitySet<L>) -> String {
    set.keys().cloned().collect::<Vec<_>>().join(" ")
}

/// Canonical stops in order, conditional ones in brackets.
pub fn stops(canonical: &CanonicalRoute) -> String {
    canonical
        .stops
        .iter()
        .map(|stop| {
            if stop.is_conditional() {
                format!("[{}]", stop.station)
            } else {
                stop.station.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn route_fields(route: &LiveRoute) -> Vec<Box<dyn Field>> {
    vec![
        field("name", route.name(), text),
        field("description", route.description(), text),
        field("color", route.color(), text),
        field("active", route.active(), flag),
        field("stops", route.canonical(), stops),
        field("stations", route.stations(), members::<LiveStation>),
        field("vehicles", route.vehicles(), members::<LiveVehicle>),
    ]
}

pub fn station_fields(station: &LiveStation) -> Vec<Box<dyn Field>> {
    vec![
        field("name", station.name(), text),
        field("location", station.location(), position),
        field("routes", station.routes(), list),
        field("vehicles", station.vehicles(), members::<LiveVehicle>),
    ]
}

pub fn vehicle_fields(vehicle: &LiveVehicle) -> Vec<Box<dyn Field>> {
    vec![
        field("route", vehicle.route(), text),
        field("station", vehicle.station(), text),
        field("next station", vehicle.next_station(), text),
        field("location", vehicle.location(), position),
        field("heading", vehicle.heading(), number::<f64>),
        field("capacity", vehicle.capacity(), number::<u32>),
        field("active", vehicle.active(), flag),
    ]
}

async fn follow(
    mut fields: Vec<Box<dyn Field>>,
    mut errors: broadcast::Receiver<wl_client::Error>,
    mut tracker: Tracker,
) {
    loop {
        let index = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tracker.finished() => {
                eprintln!("connection closed");
                break;
            }
            error = errors.recv() => {
                match error {
                    Ok(e) => eprintln!("error: {}", e),
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                continue;
            }
            (alive, index, _) = select_all(fields.iter_mut().map(|f| f.changed())) => {
                if !alive {
                    break;
                }
                index
            }
        };
        if let Some(field) = fields.get_mut(index) {
            println!("{}", field.render());
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
