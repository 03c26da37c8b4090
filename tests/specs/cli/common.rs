// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Helpers are shared across test files; not every file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// The `wayline` binary with a clean environment.
pub fn wayline() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("wayline").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("WAYLINE_LOG");
    cmd
}

/// A temp directory holding `config.toml` with `content`.
pub fn config_file(content: &str) -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    (temp, path)
}
