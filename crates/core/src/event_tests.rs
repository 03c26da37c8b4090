// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use yare::parameterized;

fn station_payload(code: &str) -> Vec<Value> {
    vec![map! { "stop_code" => code, "name" => "Central" }]
}

#[test]
fn station_update_decodes_with_originator() {
    let event =
        decode_publication("stations.BUS1", "update", Some("schedule"), &station_payload("BUS1"))
            .unwrap();
    assert_eq!(event.topic, "stations.BUS1");
    assert_eq!(event.originator(), Some("schedule"));
    match event.kind {
        EventKind::Station {
            id,
            event: StationEvent::Update(Ok(snapshot)),
        } => {
            assert_eq!(id, "BUS1");
            assert_eq!(snapshot.name.as_deref(), Some("Central"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[parameterized(
    unknown_prefix = { "agency.BUS1", "update" },
    unknown_route_event = { "routes.42", "arrive" },
    unknown_station_event = { "stations.A", "activate" },
    unknown_vehicle_event = { "vehicles.BUS1", "vehicle_update" },
    no_identifier = { "vehicles", "update" },
)]
fn unrecognized_publications_decode_to_none(topic: &str, name: &str) {
    assert_eq!(decode_publication(topic, name, None, &station_payload("A")), None);
}

#[test]
fn malformed_payload_still_produces_event() {
    let event =
        decode_publication("routes.42", "update", None, &[map! { "name" => "no id" }]).unwrap();
    assert!(event.is_malformed());
    assert_eq!(event.decode_error().unwrap().path, "routes.short_name");
}

#[test]
fn missing_payload_is_a_decode_error() {
    let event = decode_publication("vehicles.BUS1", "update", None, &[]).unwrap();
    assert_eq!(event.decode_error().unwrap().path, "vehicles[0]");
}

#[test]
fn deactivate_carries_no_payload() {
    let event = decode_publication("vehicles.BUS1", "deactivate", None, &[]).unwrap();
    assert!(!event.is_malformed());
    assert!(matches!(
        event.kind,
        EventKind::Vehicle {
            event: VehicleEvent::Deactivate,
            ..
        }
    ));
}

#[parameterized(
    approach = { "approach", TransitionKind::Approach },
    arrive = { "arrive", TransitionKind::Arrive },
    depart = { "depart", TransitionKind::Depart },
)]
fn station_transitions(name: &str, expected: TransitionKind) {
    let payload = vec![map! { "vehicle" => map! { "name" => "BUS1" }, "station" => "A" }];
    let event = decode_publication("stations.A", name, None, &payload).unwrap();
    match event.kind {
        EventKind::Station {
            event: StationEvent::Transition(kind, Ok(t)),
            ..
        } => {
            assert_eq!(kind, expected);
            assert_eq!(t.vehicle.id, "BUS1");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn route_vehicle_update_decodes_vehicle() {
    let payload = vec![map! { "name" => "BUS7", "route" => "42" }];
    let event = decode_publication("routes.42", "vehicle_update", None, &payload).unwrap();
    assert!(matches!(
        event.kind,
        EventKind::Route {
            event: RouteEvent::VehicleUpdate(Ok(ref v)),
            ..
        } if v.id == "BUS7"
    ));
}

#[test]
fn publication_header_reads_kwargs() {
    let mut kwargs = Kwargs::new();
    kwargs.insert(EVENT_KEY.into(), Value::from("update"));
    kwargs.insert(ORIGINATOR_KEY.into(), Value::from("schedule"));
    let event = decode_publication_kwargs("stations.A", &station_payload("A"), &kwargs).unwrap();
    assert_eq!(event.originator(), Some("schedule"));

    kwargs.remove(EVENT_KEY);
    assert_eq!(decode_publication_kwargs("stations.A", &station_payload("A"), &kwargs), None);
}

#[test]
fn agency_listing_decodes() {
    let args = vec![Value::Array(vec![map! { "short_name" => "1" }, map! { "short_name" => "2" }])];
    let event = decode_call_result(Procedures::AGENCY_ROUTES, &[], "schedule", &args, &Kwargs::new())
        .unwrap();
    assert_eq!(event.originator, None);
    match event.kind {
        EventKind::Listing(Listing::Routes(Ok(routes))) => assert_eq!(routes.len(), 2),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn agency_listing_with_bad_shape_is_malformed() {
    let args = vec![Value::from("not a list")];
    let event =
        decode_call_result(Procedures::AGENCY_VEHICLES, &[], "schedule", &args, &Kwargs::new())
            .unwrap();
    assert!(event.is_malformed());
}

#[test]
fn last_event_redecodes_on_original_topic() {
    let request = vec![Value::from("stations.A"), Value::from("schedule")];
    let mut kwargs = Kwargs::new();
    kwargs.insert("topic".into(), Value::from("stations.A"));
    kwargs.insert("args".into(), Value::Array(station_payload("A")));
    kwargs.insert("kwargs".into(), map! { "event" => "update" });

    let event =
        decode_call_result(Procedures::META_LAST_EVENT, &request, "schedule", &[], &kwargs).unwrap();
    assert_eq!(event.topic, "stations.A");
    // Falls back to the requested originator when the nested one is absent.
    assert_eq!(event.originator(), Some("schedule"));
    assert!(matches!(
        event.kind,
        EventKind::Station {
            event: StationEvent::Update(Ok(_)),
            ..
        }
    ));
}

#[test]
fn last_event_accepts_nested_args_form() {
    let request = vec![Value::from("routes.42"), Value::from("schedule")];
    let nested = map! {
        "topic" => "routes.42",
        "args" => vec![map! { "short_name" => "42" }],
        "kwargs" => map! { "event" => "update", "originator" => "dispatch" },
    };
    let event = decode_call_result(
        Procedures::META_LAST_EVENT,
        &request,
        "schedule",
        &[nested],
        &Kwargs::new(),
    )
    .unwrap();
    assert_eq!(event.originator(), Some("dispatch"));
    assert!(matches!(event.kind, EventKind::Route { .. }));
}

#[test]
fn last_event_without_topic_is_unknown() {
    let request = vec![Value::from("routes.42"), Value::from("schedule")];
    let args = vec![Value::from("opaque")];
    let event =
        decode_call_result(Procedures::META_LAST_EVENT, &request, "schedule", &args, &Kwargs::new())
            .unwrap();
    assert_eq!(event.topic, "routes.42");
    assert!(matches!(event.kind, EventKind::UnknownLastEvent { .. }));
    assert!(!event.is_malformed());
}

#[test]
fn schedule_lookups_route_by_suffix() {
    let visit = map! { "station" => "A", "vehicle" => "BUS1", "time" => 1_700_000_000i64 };

    let single = decode_call_result(
        "schedule.next_visit",
        &[],
        "schedule",
        &[visit.clone()],
        &Kwargs::new(),
    )
    .unwrap();
    assert!(matches!(
        single.kind,
        EventKind::Schedule(ScheduleResult::Visit(Ok(Some(_))))
    ));

    let list = decode_call_result(
        "schedule.next_visits",
        &[],
        "schedule",
        &[Value::Array(vec![visit])],
        &Kwargs::new(),
    )
    .unwrap();
    assert!(matches!(
        list.kind,
        EventKind::Schedule(ScheduleResult::Visits(Ok(ref v))) if v.len() == 1
    ));
}

#[test]
fn schedule_visit_may_be_empty() {
    let event =
        decode_call_result("schedule.next_visit", &[], "schedule", &[], &Kwargs::new()).unwrap();
    assert!(matches!(
        event.kind,
        EventKind::Schedule(ScheduleResult::Visit(Ok(None)))
    ));
}

#[test]
fn unknown_procedures_decode_to_none() {
    assert_eq!(decode_call_result("agency.fares", &[], "schedule", &[], &Kwargs::new()), None);
    assert_eq!(decode_call_result("other.next_visit", &[], "schedule", &[], &Kwargs::new()), None);
    assert_eq!(decode_call_result("schedule.status", &[], "schedule", &[], &Kwargs::new()), None);
}

#[test]
fn last_event_request_parses_pair() {
    let args = vec![Value::from("routes.42"), Value::from("schedule")];
    assert_eq!(last_event_request(&args), Some(("routes.42", "schedule")));
    assert_eq!(last_event_request(&args[..1]), None);
}
