// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for client operations.
//!
//! Every failure the client reports is one of these variants. `Unreachable`,
//! `Timeout`, and `ConnectionLost` are normally absorbed by the connection's
//! retry loops and only reach callers once a configured retry cap runs out.

use thiserror::Error;
use wl_core::DecodeError;

/// All errors surfaced by wl-client.
///
/// Errors are `Clone` so one failure can be fanned out to every observer of
/// an entity's error channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("server unreachable\n  hint: check the network connection")]
    Unreachable,

    #[error("timed out waiting for {context}")]
    Timeout { context: String },

    #[error("{target} failed: {message}")]
    Transport { target: String, message: String },

    #[error("connection lost: {reason}")]
    ConnectionLost { reason: String },

    #[error("event decode failed: {0}")]
    EventDecode(#[from] DecodeError),

    #[error("cannot apply snapshot of {from} onto {onto}")]
    ApplyMismatch { from: String, onto: String },

    #[error("state inconsistency in {within}: {description}")]
    StateInconsistency { description: String, within: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether the connection's retry loops treat this error as transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Unreachable | Error::Timeout { .. } | Error::ConnectionLost { .. }
        )
    }
}

/// A specialized Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
