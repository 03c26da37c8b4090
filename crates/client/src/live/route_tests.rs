// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use wl_core::{decode_publication, map, StationSnapshot, StopMarker, Value, VehicleSnapshot};

use super::*;
use crate::Error;

fn event(name: &str, args: Vec<Value>) -> TopicEvent {
    decode_publication("routes.1", name, Some("schedule"), &args).unwrap()
}

fn itinerary(stops: &[&str]) -> Option<Vec<String>> {
    Some(stops.iter().map(|s| s.to_string()).collect())
}

#[test]
fn itinerary_change_recomputes_canonical_route() {
    let registry = Registry::new();
    let route = registry.route_or_insert("1");
    let mut observer = route.canonical().watch();

    route
        .apply(&RouteSnapshot {
            itinerary: itinerary(&["S0", "S1", "S2", "S0", "S1", "S3", "S2", "S0", "S1", "S2"]),
            ..RouteSnapshot::new("1")
        })
        .unwrap();

    assert!(observer.has_changed().unwrap());
    assert_eq!(
        route.canonical().get().stops,
        vec![
            StopMarker::constant("S0"),
            StopMarker::constant("S1"),
            StopMarker::conditional("S3"),
            StopMarker::constant("S2"),
        ]
    );
}

#[test]
fn same_itinerary_does_not_notify() {
    let registry = Registry::new();
    let route = registry.route_or_insert("1");
    let snapshot = RouteSnapshot {
        itinerary: itinerary(&["A", "B", "A", "B"]),
        ..RouteSnapshot::new("1")
    };
    route.apply(&snapshot).unwrap();
    let mut observer = route.canonical().watch();
    observer.borrow_and_update();

    route.apply(&snapshot).unwrap();

    assert!(!observer.has_changed().unwrap());
}

#[test]
fn apply_reconciles_stations_and_vehicles() {
    let registry = Registry::new();
    let route = registry.route_or_insert("1");
    route
        .apply(&RouteSnapshot {
            name: Some("Crosstown".to_string()),
            stations: Some(vec![
                StationSnapshot::new("A"),
                StationSnapshot::new("B"),
                StationSnapshot::new("C"),
            ]),
            vehicles: Some(vec![VehicleSnapshot::new("BUS1")]),
            ..RouteSnapshot::new("1")
        })
        .unwrap();
    let before = route.stations().get();

    route
        .apply(&RouteSnapshot {
            stations: Some(vec![
                StationSnapshot::new("B"),
                StationSnapshot::new("C"),
                StationSnapshot::new("D"),
            ]),
            ..RouteSnapshot::new("1")
        })
        .unwrap();

    let after = route.stations().get();
    assert_eq!(after.keys().cloned().collect::<Vec<_>>(), vec!["B", "C", "D"]);
    assert!(Arc::ptr_eq(&before["B"], &after["B"]));
    assert!(Arc::ptr_eq(&before["C"], &after["C"]));
    assert_eq!(route.name().get(), Some("Crosstown".to_string()));
    assert_eq!(route.vehicles().with(|set| set.len()), 1);
}

#[test]
fn mismatched_nested_snapshot_fails_but_applies_siblings() {
    let registry = Registry::new();
    let route = registry.route_or_insert("1");
    route.stations().modify(|set| {
        set.insert("A".to_string(), registry.station_or_insert("Z"));
        true
    });

    let err = route
        .apply(&RouteSnapshot {
            stations: Some(vec![StationSnapshot::new("A")]),
            vehicles: Some(vec![VehicleSnapshot::new("BUS1")]),
            ..RouteSnapshot::new("1")
        })
        .unwrap_err();

    assert!(matches!(err, Error::ApplyMismatch { .. }));
    assert_eq!(route.vehicles().with(|set| set.len()), 1);
}

#[test]
fn vehicle_update_touches_held_vehicle_in_place() {
    let registry = Registry::new();
    let route = registry.route_or_insert("1");
    route
        .apply(&RouteSnapshot {
            vehicles: Some(vec![VehicleSnapshot::new("BUS1")]),
            ..RouteSnapshot::new("1")
        })
        .unwrap();
    let bus = route.vehicles().get()["BUS1"].clone();

    route
        .handle(&event(
            "vehicle_update",
            vec![map! { "name" => "BUS1", "station" => "B" }],
        ))
        .unwrap();

    assert_eq!(bus.station().get(), Some("B".to_string()));
    assert!(Arc::ptr_eq(&route.vehicles().get()["BUS1"], &bus));
}

#[test]
fn activation_events_toggle_active() {
    let registry = Registry::new();
    let route = registry.route_or_insert("1");

    route
        .handle(&event("activate", vec![map! { "short_name" => "1", "color" => "#ff0000" }]))
        .unwrap();
    assert_eq!(route.active().get(), Some(true));
    assert_eq!(route.color().get(), Some("#ff0000".to_string()));

    route.handle(&event("deactivate", vec![])).unwrap();
    assert_eq!(route.active().get(), Some(false));
}

#[test]
fn canonical_stations_follow_canonical_order() {
    let registry = Registry::new();
    let route = registry.route_or_insert("1");
    route
        .apply(&RouteSnapshot {
            itinerary: itinerary(&["C", "A", "B", "C", "A"]),
            stations: Some(vec![StationSnapshot::new("A"), StationSnapshot::new("C")]),
            ..RouteSnapshot::new("1")
        })
        .unwrap();

    let ids: Vec<String> = route
        .canonical_stations()
        .iter()
        .map(|s| s.id().to_string())
        .collect();

    assert_eq!(ids, vec!["C", "A"]);
}
