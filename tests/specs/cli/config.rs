// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for `wayline config` and configuration loading.

#![allow(clippy::unwrap_used)]

#[path = "common.rs"]
mod common;

use common::*;

#[test]
fn missing_file_prints_defaults() {
    let temp = TempDir::new().unwrap();

    wayline()
        .arg("config")
        .arg("--config")
        .arg(temp.path().join("absent.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("url = \"ws://localhost:8080/ws\""))
        .stdout(predicate::str::contains("time_resolution_secs = 30"))
        .stdout(predicate::str::contains("search_radius_m = 500"));
}

#[test]
fn file_values_override_defaults() {
    let (_temp, path) = config_file(
        "[server]\nurl = \"wss://transit.example/ws\"\n\n[connection]\nreconnect_delay_ms = 250\n",
    );

    wayline()
        .arg("config")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("url = \"wss://transit.example/ws\""))
        .stdout(predicate::str::contains("reconnect_delay_ms = 250"))
        .stdout(predicate::str::contains("realm = \"realm1\""));
}

#[test]
fn invalid_url_is_rejected() {
    let (_temp, path) = config_file("[server]\nurl = \"http://transit.example\"\n");

    wayline()
        .arg("config")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: invalid configuration"));
}

#[test]
fn unparsable_file_is_rejected() {
    let (_temp, path) = config_file("[server\n");

    wayline()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"));
}
