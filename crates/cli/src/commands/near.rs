// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use wl_client::{ClientConfig, LiveStation};
use wl_core::Coordinate;

use super::list::or_dash;
use super::with_client;
use crate::error::{Error, Result};

pub fn run(config: &ClientConfig, lat: f64, lon: f64) -> Result<()> {
    let here = Coordinate { lat, lon };
    let lines = with_client(config, |client| async move {
        let nearby = client.stations_near(here).await?;
        Ok::<_, Error>(
            nearby
                .iter()
                .map(|(station, distance)| nearby_line(station, *distance))
                .collect::<Vec<_>>(),
        )
    })?;
    if lines.is_empty() {
        println!("No stations within {} m.", config.agency.search_radius_m);
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

pub fn nearby_line(station: &LiveStation, distance_m: f64) -> String {
    format!(
        "{:>5.0} m\t{}\t{}",
        distance_m,
        station.id(),
        or_dash(station.name().get())
    )
}

#[cfg(test)]
#[path = "near_tests.rs"]
mod tests;
