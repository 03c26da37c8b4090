// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Specs for help output.

#[path = "common.rs"]
mod common;

use common::*;
use yare::parameterized;

#[test]
fn help_lists_commands() {
    wayline()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("canonical"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("Examples:"));
}

#[test]
fn no_arguments_prints_usage() {
    wayline()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[parameterized(
    canonical = { "canonical" },
    decode = { "decode" },
    list = { "list" },
    watch = { "watch" },
    visits = { "visits" },
    near = { "near" },
    config = { "config" },
)]
fn every_command_has_help(command: &str) {
    wayline()
        .args([command, "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn version_flag_prints_version() {
    wayline()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("wayline "));
}
