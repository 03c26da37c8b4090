// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed topic events and the decoder that produces them.
//!
//! Decoding is a pure function of its inputs. Two entry points exist:
//!
//! - [`decode_publication`] for messages published on a topic, routed by the
//!   topic's namespace prefix and the publication's event name.
//! - [`decode_call_result`] for procedure results, routed by procedure name.
//!
//! Unrecognized topics, event names, and procedures decode to `None`; the
//! protocol is tolerant and unknown traffic is ignored. A recognized event
//! whose payload is malformed still decodes, carrying the failure in its
//! [`Decoded`] payload so it can reach the entity it concerns.

use crate::error::{DecodeError, DecodeResult};
use crate::snapshot::{
    RouteSnapshot, ScheduledVisit, Snapshot, StationSnapshot, Transition, TransitionKind,
    VehicleSnapshot,
};
use crate::topic::{split_topic, Namespace, Procedures};
use crate::value::{decode_list, Args, Fields, Kwargs, Value};

/// A payload that may have failed to decode.
pub type Decoded<T> = DecodeResult<T>;

/// Keyword carrying a publication's event name.
pub const EVENT_KEY: &str = "event";
/// Keyword carrying a publication's originator.
pub const ORIGINATOR_KEY: &str = "originator";

/// One decoded message, tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicEvent {
    /// Topic the event was sent in; procedure name for listings and schedule results.
    pub topic: String,
    /// Who produced the event. Events without one are never cached.
    pub originator: Option<String>,
    pub kind: EventKind,
}

/// The typed content of a [`TopicEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Vehicle { id: String, event: VehicleEvent },
    Station { id: String, event: StationEvent },
    Route { id: String, event: RouteEvent },
    Listing(Listing),
    Schedule(ScheduleResult),
    /// A `meta.last_event` reply whose original topic could not be recovered.
    UnknownLastEvent { args: Args, kwargs: Kwargs },
}

#[derive(Debug, Clone, PartialEq)]
pub enum VehicleEvent {
    Update(Decoded<VehicleSnapshot>),
    Activate(Decoded<VehicleSnapshot>),
    Deactivate,
    Transition(TransitionKind, Decoded<Transition>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StationEvent {
    Update(Decoded<StationSnapshot>),
    VehicleUpdate(Decoded<VehicleSnapshot>),
    Transition(TransitionKind, Decoded<Transition>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteEvent {
    Update(Decoded<RouteSnapshot>),
    VehicleUpdate(Decoded<VehicleSnapshot>),
    Activate(Decoded<RouteSnapshot>),
    Deactivate,
}

/// Agency-wide listings.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Vehicles(Decoded<Vec<VehicleSnapshot>>),
    Stations(Decoded<Vec<StationSnapshot>>),
    Routes(Decoded<Vec<RouteSnapshot>>),
}

/// Results of schedule lookups.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleResult {
    Visit(Decoded<Option<ScheduledVisit>>),
    Visits(Decoded<Vec<ScheduledVisit>>),
}

impl TopicEvent {
    pub fn originator(&self) -> Option<&str> {
        self.originator.as_deref()
    }

    /// The decode failure carried by this event's payload, if any.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        fn err<T>(decoded: &Decoded<T>) -> Option<&DecodeError> {
            decoded.as_ref().err()
        }

        match &self.kind {
            EventKind::Vehicle { event, .. } => match event {
                VehicleEvent::Update(d) | VehicleEvent::Activate(d) => err(d),
                VehicleEvent::Transition(_, d) => err(d),
                VehicleEvent::Deactivate => None,
            },
            EventKind::Station { event, .. } => match event {
                StationEvent::Update(d) => err(d),
                StationEvent::VehicleUpdate(d) => err(d),
                StationEvent::Transition(_, d) => err(d),
            },
            EventKind::Route { event, .. } => match event {
                RouteEvent::Update(d) | RouteEvent::Activate(d) => err(d),
                RouteEvent::VehicleUpdate(d) => err(d),
                RouteEvent::Deactivate => None,
            },
            EventKind::Listing(listing) => match listing {
                Listing::Vehicles(d) => err(d),
                Listing::Stations(d) => err(d),
                Listing::Routes(d) => err(d),
            },
            EventKind::Schedule(result) => match result {
                ScheduleResult::Visit(d) => err(d),
                ScheduleResult::Visits(d) => err(d),
            },
            EventKind::UnknownLastEvent { .. } => None,
        }
    }

    /// Whether the payload failed to decode.
    pub fn is_malformed(&self) -> bool {
        self.decode_error().is_some()
    }
}

/// Extract the event name and originator carried in publication kwargs.
pub fn publication_header(kwargs: &Kwargs) -> (Option<&str>, Option<&str>) {
    let event = kwargs.get(EVENT_KEY).and_then(Value::as_str);
    let originator = kwargs.get(ORIGINATOR_KEY).and_then(Value::as_str);
    (event, originator)
}

/// Decode the first positional argument as a snapshot.
fn first<T>(path: &str, args: &[Value], decode: impl Fn(&str, &Value) -> DecodeResult<T>) -> Decoded<T> {
    match args.first() {
        Some(value) => decode(path, value),
        None => Err(DecodeError::missing(format!("{}[0]", path), "payload")),
    }
}

/// Decode a message published on `topic`.
///
/// Returns `None` for unknown namespaces and unknown event names.
pub fn decode_publication(
    topic: &str,
    event: &str,
    originator: Option<&str>,
    args: &[Value],
) -> Option<TopicEvent> {
    let (namespace, id) = split_topic(topic)?;
    let path = namespace.as_str();
    let kind = match namespace {
        Namespace::Vehicles => {
            let event = match event {
                "update" => VehicleEvent::Update(first(path, args, VehicleSnapshot::decode)),
                "activate" => VehicleEvent::Activate(first(path, args, VehicleSnapshot::decode)),
                "deactivate" => VehicleEvent::Deactivate,
                other => {
                    let transition = TransitionKind::parse(other)?;
                    VehicleEvent::Transition(transition, first(path, args, Transition::decode))
                }
            };
            EventKind::Vehicle {
                id: id.to_string(),
                event,
            }
        }
        Namespace::Stations => {
            let event = match event {
                "update" => StationEvent::Update(first(path, args, StationSnapshot::decode)),
                "vehicle_update" => {
                    StationEvent::VehicleUpdate(first(path, args, VehicleSnapshot::decode))
                }
                other => {
                    let transition = TransitionKind::parse(other)?;
                    StationEvent::Transition(transition, first(path, args, Transition::decode))
                }
            };
            EventKind::Station {
                id: id.to_string(),
                event,
            }
        }
        Namespace::Routes => {
            let event = match event {
                "update" => RouteEvent::Update(first(path, args, RouteSnapshot::decode)),
                "vehicle_update" => {
                    RouteEvent::VehicleUpdate(first(path, args, VehicleSnapshot::decode))
                }
                "activate" => RouteEvent::Activate(first(path, args, RouteSnapshot::decode)),
                "deactivate" => RouteEvent::Deactivate,
                _ => return None,
            };
            EventKind::Route {
                id: id.to_string(),
                event,
            }
        }
    };

    Some(TopicEvent {
        topic: topic.to_string(),
        originator: originator.map(str::to_string),
        kind,
    })
}

/// Decode a publication whose header travels in its kwargs.
pub fn decode_publication_kwargs(topic: &str, args: &[Value], kwargs: &Kwargs) -> Option<TopicEvent> {
    let (event, originator) = publication_header(kwargs);
    decode_publication(topic, event?, originator, args)
}

/// Decode the result of calling `procedure` with `request_args`.
///
/// `schedule_service` names the service whose procedures are schedule
/// lookups; results from other unknown procedures decode to `None`.
pub fn decode_call_result(
    procedure: &str,
    request_args: &[Value],
    schedule_service: &str,
    args: &[Value],
    kwargs: &Kwargs,
) -> Option<TopicEvent> {
    let listing = |kind: EventKind| TopicEvent {
        topic: procedure.to_string(),
        originator: None,
        kind,
    };

    match procedure {
        Procedures::AGENCY_VEHICLES => Some(listing(EventKind::Listing(Listing::Vehicles(first(
            "vehicles",
            args,
            |p, v| decode_list(p, v, VehicleSnapshot::decode),
        ))))),
        Procedures::AGENCY_STATIONS => Some(listing(EventKind::Listing(Listing::Stations(first(
            "stations",
            args,
            |p, v| decode_list(p, v, StationSnapshot::decode),
        ))))),
        Procedures::AGENCY_ROUTES => Some(listing(EventKind::Listing(Listing::Routes(first(
            "routes",
            args,
            |p, v| decode_list(p, v, RouteSnapshot::decode),
        ))))),
        Procedures::META_LAST_EVENT => decode_last_event(request_args, args, kwargs),
        _ => {
            let name = procedure
                .strip_prefix(schedule_service)
                .and_then(|rest| rest.strip_prefix('.'))?;
            let result = if name.ends_with("visits") {
                ScheduleResult::Visits(first("visits", args, |p, v| {
                    decode_list(p, v, ScheduledVisit::decode)
                }))
            } else if name.ends_with("visit") {
                ScheduleResult::Visit(match args.first() {
                    None | Some(Value::Null) => Ok(None),
                    Some(value) => ScheduledVisit::decode("visit", value).map(Some),
                })
            } else {
                return None;
            };
            Some(listing(EventKind::Schedule(result)))
        }
    }
}

/// The `(topic, originator)` pair a `meta.last_event` request asks about.
pub fn last_event_request(args: &[Value]) -> Option<(&str, &str)> {
    match args {
        [topic, originator, ..] => Some((topic.as_str()?, originator.as_str()?)),
        _ => None,
    }
}

/// Re-decode a `meta.last_event` reply as if it had arrived on its topic.
fn decode_last_event(request_args: &[Value], args: &[Value], kwargs: &Kwargs) -> Option<TopicEvent> {
    let requested = last_event_request(request_args);
    let requested_originator = requested.map(|(_, originator)| originator);

    // The reply nests the original message either in kwargs or as args[0].
    let nested = if kwargs.contains_key("topic") {
        Some(Value::Map(kwargs.clone()))
    } else {
        args.first().filter(|v| v.get("topic").is_some()).cloned()
    };

    let unknown = || TopicEvent {
        topic: requested
            .map(|(topic, _)| topic.to_string())
            .unwrap_or_else(|| Procedures::META_LAST_EVENT.to_string()),
        originator: requested_originator.map(str::to_string),
        kind: EventKind::UnknownLastEvent {
            args: args.to_vec(),
            kwargs: kwargs.clone(),
        },
    };

    let Some(nested) = nested else {
        return Some(unknown());
    };
    let Ok(fields) = Fields::new("last_event", &nested) else {
        return Some(unknown());
    };
    let Ok(topic) = fields.required_str("topic") else {
        return Some(unknown());
    };

    let original_args = fields
        .raw("args")
        .and_then(Value::as_array)
        .map(<[Value]>::to_vec)
        .unwrap_or_default();
    let original_kwargs = fields
        .raw("kwargs")
        .and_then(Value::as_map)
        .cloned()
        .unwrap_or_default();

    let (event, originator) = publication_header(&original_kwargs);
    decode_publication(
        &topic,
        event?,
        originator.or(requested_originator),
        &original_args,
    )
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
