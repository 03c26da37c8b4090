// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use wl_client::ClientConfig;
use wl_core::ScheduledVisit;

use super::list::or_dash;
use super::with_client;
use crate::error::{Error, Result};

pub fn run(config: &ClientConfig, stop: &str, limit: u32) -> Result<()> {
    let visits = with_client(config, |client| async move {
        Ok::<_, Error>(client.next_visits(stop, limit).await?)
    })?;
    if visits.is_empty() {
        println!("No upcoming visits at {}.", stop);
    }
    for visit in &visits {
        println!("{}", visit_line(visit));
    }
    Ok(())
}

pub fn visit_line(visit: &ScheduledVisit) -> String {
    format!(
        "{}\t{}\t{}",
        visit.time.format("%Y-%m-%d %H:%M:%S UTC"),
        or_dash(visit.route.clone()),
        or_dash(visit.vehicle.clone())
    )
}

#[cfg(test)]
#[path = "visits_tests.rs"]
mod tests;
