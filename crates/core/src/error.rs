// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for wl-core operations.

use thiserror::Error;

use crate::value::Value;

/// A payload that could not be decoded into the expected shape.
///
/// Decode errors are plain data: they travel inside events so that a
/// malformed payload can still be routed to the entity it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot decode {path}: expected {expected}, found {found}")]
pub struct DecodeError {
    /// Dotted path of the offending field (`route.stations[1].stop_code`).
    pub path: String,
    /// The shape the decoder wanted.
    pub expected: String,
    /// What was actually there.
    pub found: String,
}

impl DecodeError {
    /// A field that was present with the wrong shape.
    pub fn new(path: impl Into<String>, expected: impl Into<String>, found: &Value) -> Self {
        DecodeError {
            path: path.into(),
            expected: expected.into(),
            found: found.kind().to_string(),
        }
    }

    /// A required field that was absent.
    pub fn missing(path: impl Into<String>, expected: impl Into<String>) -> Self {
        DecodeError {
            path: path.into(),
            expected: expected.into(),
            found: "nothing".to_string(),
        }
    }

    /// A field whose shape was right but whose content was not.
    pub fn invalid(path: impl Into<String>, expected: impl Into<String>, found: impl Into<String>) -> Self {
        DecodeError {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// A specialized Result type for payload decoding.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
