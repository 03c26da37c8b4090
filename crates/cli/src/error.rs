// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All errors reported by the wayline command line.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] wl_client::Error),

    #[error("invalid payload: {0}\n  hint: pass the positional arguments as a JSON array")]
    InvalidPayload(String),

    #[error("no event: '{event}' on '{topic}' is not a recognized publication")]
    NoEvent { topic: String, event: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
