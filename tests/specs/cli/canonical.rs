// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `wayline canonical`.

#![allow(clippy::unwrap_used)]

#[path = "common.rs"]
mod common;

use common::*;
use yare::parameterized;

#[parameterized(
    single_loop = { &["S0", "S1", "S2", "S0", "S1", "S2"], "constant S0\nconstant S1\nconstant S2\n" },
    conditional_stop = {
        &["S0", "S1", "S2", "S0", "S1", "S3", "S2", "S0", "S1", "S2"],
        "constant S0\nconstant S1\nconditional S3\nconstant S2\n"
    },
    lead_in = { &["S3", "S0", "S1", "S2", "S0", "S1", "S2"], "conditional S3\nconstant S0\nconstant S1\nconstant S2\n" },
    never_loops = { &["A", "B", "C"], "constant A\nconstant B\nconstant C\n" },
    dwell_collapsed = { &["A", "A", "B", "A"], "constant A\nconstant B\n" },
)]
fn prints_canonical_route(stops: &[&str], expected: &str) {
    wayline()
        .arg("canonical")
        .args(stops)
        .assert()
        .success()
        .stdout(expected.to_string())
        .stderr("");
}

#[test]
fn json_output_is_machine_readable() {
    let output = wayline()
        .args(["canonical", "A", "B", "A", "C", "B", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let stops = value["stops"].as_array().unwrap();
    assert_eq!(stops.len(), 3);
    assert_eq!(stops[0]["station"], "A");
    assert_eq!(stops[0]["kind"], "constant");
    assert!(value["conflicts"].as_array().is_some());
}

#[test]
fn requires_at_least_one_stop() {
    wayline()
        .arg("canonical")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
