// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable, decoded point-in-time views of backend entities.
//!
//! Every optional attribute distinguishes "not sent" (`None`) from a sent
//! value; nested collections in particular use `None` for "not requested"
//! and `Some(vec![])` for "now empty".

use chrono::{DateTime, TimeZone, Utc};
use geo::{HaversineDistance, Point};

use crate::error::{DecodeError, DecodeResult};
use crate::value::{decode_string, Fields, Value};

/// A decoded snapshot with a stable identifier.
pub trait Snapshot: Sized {
    /// Identifier of the entity the snapshot describes.
    fn id(&self) -> &str;

    /// Decode a snapshot from a wire value found at `path`.
    fn decode(path: &str, value: &Value) -> DecodeResult<Self>;
}

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Accepts `{lat, lon}` maps and `[lat, lon]` pairs.
    pub fn decode(path: &str, value: &Value) -> DecodeResult<Self> {
        if let Some(pair) = value.as_array() {
            return match pair {
                [lat, lon] => match (lat.as_f64(), lon.as_f64()) {
                    (Some(lat), Some(lon)) => Ok(Coordinate { lat, lon }),
                    _ => Err(DecodeError::invalid(path, "[lat, lon] numbers", "non-numeric pair")),
                },
                _ => Err(DecodeError::invalid(
                    path,
                    "[lat, lon] pair",
                    format!("array of {}", pair.len()),
                )),
            };
        }
        let fields = Fields::new(path, value)?;
        let lat = fields.optional_f64("lat")?;
        let lon = fields.optional_f64("lon")?;
        match (lat, lon) {
            (Some(lat), Some(lon)) => Ok(Coordinate { lat, lon }),
            _ => Err(DecodeError::missing(path, "lat and lon")),
        }
    }

    /// Great-circle (haversine) distance in meters.
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        self.point().haversine_distance(&other.point())
    }

    fn point(&self) -> Point {
        Point::new(self.lon, self.lat)
    }
}

/// A vehicle as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VehicleSnapshot {
    /// Vehicle name.
    pub id: String,
    pub capacity: Option<u32>,
    pub location: Option<Coordinate>,
    /// Heading in degrees clockwise from north.
    pub heading: Option<f64>,
    /// Short name of the route the vehicle is serving.
    pub route: Option<String>,
    /// Stop code of the station the vehicle is at or last departed.
    pub station: Option<String>,
    /// Stop code of the station the vehicle is heading to.
    pub next_station: Option<String>,
    pub active: Option<bool>,
}

impl VehicleSnapshot {
    pub fn new(id: impl Into<String>) -> Self {
        VehicleSnapshot {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Snapshot for VehicleSnapshot {
    fn id(&self) -> &str {
        &self.id
    }

    fn decode(path: &str, value: &Value) -> DecodeResult<Self> {
        let fields = Fields::new(path, value)?;
        Ok(VehicleSnapshot {
            id: fields.required_str("name")?,
            capacity: fields.optional_u32("capacity")?,
            location: fields.optional_with("location", Coordinate::decode)?,
            heading: fields.optional_f64("heading")?,
            route: fields.optional_str("route")?,
            station: fields.optional_str("station")?,
            next_station: fields.optional_str("next_station")?,
            active: fields.optional_bool("active")?,
        })
    }
}

/// A station (stop) as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationSnapshot {
    /// Stop code.
    pub id: String,
    pub name: Option<String>,
    pub location: Option<Coordinate>,
    /// Short names of routes serving the station.
    pub routes: Option<Vec<String>>,
    /// Vehicles currently at or approaching the station.
    pub vehicles: Option<Vec<VehicleSnapshot>>,
}

impl StationSnapshot {
    pub fn new(id: impl Into<String>) -> Self {
        StationSnapshot {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Snapshot for StationSnapshot {
    fn id(&self) -> &str {
        &self.id
    }

    fn decode(path: &str, value: &Value) -> DecodeResult<Self> {
        let fields = Fields::new(path, value)?;
        Ok(StationSnapshot {
            id: fields.required_str("stop_code")?,
            name: fields.optional_str("name")?,
            location: fields.optional_with("location", Coordinate::decode)?,
            routes: fields.optional_list("routes", decode_string)?,
            vehicles: fields.optional_list("vehicles", VehicleSnapshot::decode)?,
        })
    }
}

/// A route as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteSnapshot {
    /// Route short name.
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Display color, usually `#rrggbb`.
    pub color: Option<String>,
    pub active: Option<bool>,
    /// Raw stop sequence, repeating every loop.
    pub itinerary: Option<Vec<String>>,
    pub stations: Option<Vec<StationSnapshot>>,
    pub vehicles: Option<Vec<VehicleSnapshot>>,
}

impl RouteSnapshot {
    pub fn new(id: impl Into<String>) -> Self {
        RouteSnapshot {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Snapshot for RouteSnapshot {
    fn id(&self) -> &str {
        &self.id
    }

    fn decode(path: &str, value: &Value) -> DecodeResult<Self> {
        let fields = Fields::new(path, value)?;
        Ok(RouteSnapshot {
            id: fields.required_str("short_name")?,
            name: fields.optional_str("name")?,
            description: fields.optional_str("description")?,
            color: fields.optional_str("color")?,
            active: fields.optional_bool("active")?,
            itinerary: fields.optional_list("itinerary", decode_string)?,
            stations: fields.optional_list("stations", StationSnapshot::decode)?,
            vehicles: fields.optional_list("vehicles", VehicleSnapshot::decode)?,
        })
    }
}

/// How a vehicle relates to a station in a transition event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Approach,
    Arrive,
    Depart,
}

impl TransitionKind {
    pub fn parse(event: &str) -> Option<Self> {
        match event {
            "approach" => Some(TransitionKind::Approach),
            "arrive" => Some(TransitionKind::Arrive),
            "depart" => Some(TransitionKind::Depart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Approach => "approach",
            TransitionKind::Arrive => "arrive",
            TransitionKind::Depart => "depart",
        }
    }
}

/// A vehicle moving relative to a station.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub vehicle: VehicleSnapshot,
    /// Stop code of the station.
    pub station: String,
}

impl Transition {
    pub fn decode(path: &str, value: &Value) -> DecodeResult<Self> {
        let fields = Fields::new(path, value)?;
        Ok(Transition {
            vehicle: fields.required_with("vehicle", "map", VehicleSnapshot::decode)?,
            station: fields.required_str("station")?,
        })
    }
}

/// One scheduled or predicted visit of a station.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledVisit {
    pub station: String,
    pub vehicle: Option<String>,
    pub route: Option<String>,
    pub time: DateTime<Utc>,
}

impl ScheduledVisit {
    pub fn decode(path: &str, value: &Value) -> DecodeResult<Self> {
        let fields = Fields::new(path, value)?;
        Ok(ScheduledVisit {
            station: fields.required_str("station")?,
            vehicle: fields.optional_str("vehicle")?,
            route: fields.optional_str("route")?,
            time: fields.required_with("time", "timestamp", decode_time)?,
        })
    }
}

/// Decode unix seconds (integer or fractional) or an RFC 3339 string.
pub fn decode_time(path: &str, value: &Value) -> DecodeResult<DateTime<Utc>> {
    let parsed = match value {
        Value::Int(secs) => Utc.timestamp_opt(*secs, 0).single(),
        Value::Float(secs) if secs.is_finite() => {
            // CORRECTNESS: finite timestamps in the representable chrono range fit in i64 millis
            #[allow(clippy::cast_possible_truncation)]
            let millis = (secs * 1000.0).round() as i64;
            Utc.timestamp_millis_opt(millis).single()
        }
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        other => return Err(DecodeError::new(path, "timestamp", other)),
    };
    parsed.ok_or_else(|| DecodeError::invalid(path, "timestamp", value.to_string()))
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
