// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;
use wl_core::{reduce, CanonicalRoute, OrderingConflict};

use crate::cli::OutputFormat;
use crate::error::Result;

pub fn run(stops: &[String], output: OutputFormat) -> Result<()> {
    let canonical = reduce(stops);
    for conflict in &canonical.conflicts {
        eprintln!("warning: {}", describe_conflict(conflict));
    }
    match output {
        OutputFormat::Text => print!("{}", format_text(&canonical)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(&canonical))?),
    }
    Ok(())
}

/// One `<kind> <station>` line per stop.
pub fn format_text(canonical: &CanonicalRoute) -> String {
    canonical
        .stops
        .iter()
        .map(|stop| format!("{} {}\n", stop.kind, stop.station))
        .collect()
}

pub fn to_json(canonical: &CanonicalRoute) -> serde_json::Value {
    let stops: Vec<_> = canonical
        .stops
        .iter()
        .map(|stop| json!({ "station": stop.station, "kind": stop.kind.as_str() }))
        .collect();
    let conflicts: Vec<_> = canonical
        .conflicts
        .iter()
        .map(|c| json!({ "station": c.station, "index": c.index }))
        .collect();
    json!({ "stops": stops, "conflicts": conflicts })
}

pub fn describe_conflict(conflict: &OrderingConflict) -> String {
    format!(
        "{} at itinerary position {} contradicts the order of an earlier loop",
        conflict.station, conflict.index
    )
}

#[cfg(test)]
#[path = "canonical_tests.rs"]
mod tests;
