// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Topic and procedure naming.
//!
//! Topics have the form `<namespace>.<identifier>` and double as cache
//! keys, so every component builds them through this module.

use std::fmt;

/// Entity namespaces that publish on per-entity topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Vehicles,
    Stations,
    Routes,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Vehicles => "vehicles",
            Namespace::Stations => "stations",
            Namespace::Routes => "routes",
        }
    }

    /// Parse a namespace prefix (`vehicles`, `stations`, `routes`).
    pub fn parse(prefix: &str) -> Option<Self> {
        match prefix {
            "vehicles" => Some(Namespace::Vehicles),
            "stations" => Some(Namespace::Stations),
            "routes" => Some(Namespace::Routes),
            _ => None,
        }
    }

    /// The topic for one entity of this namespace.
    pub fn topic(&self, id: &str) -> String {
        format!("{}.{}", self.as_str(), id)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a topic into its namespace and entity identifier.
///
/// Only the first `.` separates the two: identifiers may themselves
/// contain dots. Unknown namespaces and empty identifiers yield `None`.
pub fn split_topic(topic: &str) -> Option<(Namespace, &str)> {
    let (prefix, id) = topic.split_once('.')?;
    if id.is_empty() {
        return None;
    }
    Namespace::parse(prefix).map(|ns| (ns, id))
}

/// Procedure names understood by the decoder.
pub struct Procedures;

impl Procedures {
    /// Agency-wide vehicle listing.
    pub const AGENCY_VEHICLES: &'static str = "agency.vehicles";
    /// Agency-wide station listing.
    pub const AGENCY_STATIONS: &'static str = "agency.stations";
    /// Agency-wide route listing.
    pub const AGENCY_ROUTES: &'static str = "agency.routes";
    /// Replay of the last event an originator published on a topic.
    ///
    /// Arguments: `[topic, originator]`.
    pub const META_LAST_EVENT: &'static str = "meta.last_event";

    /// A schedule lookup on the configured schedule service:
    /// `schedule.next_visit`.
    pub fn schedule(service: &str, name: &str) -> String {
        format!("{}.{}", service, name)
    }
}

#[cfg(test)]
#[path = "topic_tests.rs"]
mod tests;
