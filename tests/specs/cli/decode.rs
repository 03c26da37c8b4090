// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `wayline decode`.

#[path = "common.rs"]
mod common;

use common::*;

#[test]
fn decodes_station_update() {
    wayline()
        .args([
            "decode",
            "--topic",
            "stations.BUS1",
            "--event",
            "update",
            "--originator",
            "schedule",
            r#"[{"stop_code": "BUS1", "name": "Central"}]"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Station"))
        .stdout(predicate::str::contains("\"Central\""))
        .stdout(predicate::str::contains("\"schedule\""));
}

#[test]
fn malformed_payload_warns_but_succeeds() {
    wayline()
        .args(["decode", "--topic", "vehicles.BUS7", "--event", "update", r#"[42]"#])
        .assert()
        .success()
        .stderr(predicate::str::starts_with("warning: cannot decode"));
}

#[test]
fn unknown_topic_is_no_event() {
    wayline()
        .args(["decode", "--topic", "depots.A", "--event", "update", "[]"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::starts_with("error: no event"));
}

#[test]
fn payload_must_be_json_array() {
    wayline()
        .args(["decode", "--topic", "stations.A", "--event", "update", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid payload"));
}
