// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};

use super::*;

#[test]
fn visit_line_shows_time_route_and_vehicle() {
    let visit = ScheduledVisit {
        station: "A".to_string(),
        vehicle: None,
        route: Some("1".to_string()),
        time: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    };

    assert_eq!(visit_line(&visit), "2023-11-14 22:13:20 UTC\t1\t-");
}
