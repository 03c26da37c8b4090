// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use yare::parameterized;

use super::*;

#[parameterized(
    quiet = { false, "warn" },
    verbose = { true, "debug" },
)]
fn verbosity_selects_default_filter(verbose: bool, expected: &str) {
    assert_eq!(default_directive(verbose), expected);
}
