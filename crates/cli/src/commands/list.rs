// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use wl_client::{ClientConfig, LiveRoute, LiveStation, LiveVehicle};

use super::with_client;
use crate::cli::ListingKind;
use crate::error::{Error, Result};

pub fn run(config: &ClientConfig, kind: ListingKind) -> Result<()> {
    let lines = with_client(config, |client| async move {
        let lines: Vec<String> = match kind {
            ListingKind::Routes => client.routes().await?.iter().map(|r| route_line(r)).collect(),
            ListingKind::Stations => client.stations().await?.iter().map(|s| station_line(s)).collect(),
            ListingKind::Vehicles => client.vehicles().await?.iter().map(|v| vehicle_line(v)).collect(),
        };
        Ok::<Vec<String>, Error>(lines)
    })?;
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Placeholder for attributes the server did not send.
pub(crate) fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

pub fn route_line(route: &LiveRoute) -> String {
    format!("{}\t{}", route.id(), or_dash(route.name().get()))
}

pub fn station_line(station: &LiveStation) -> String {
    format!("{}\t{}", station.id(), or_dash(station.name().get()))
}

pub fn vehicle_line(vehicle: &LiveVehicle) -> String {
    format!(
        "{}\t{}\t{}",
        vehicle.id(),
        or_dash(vehicle.route().get()),
        or_dash(vehicle.station().get())
    )
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
