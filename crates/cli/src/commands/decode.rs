// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use wl_core::{decode_publication, TopicEvent, Value};

use crate::error::{Error, Result};

pub fn run(topic: &str, event: &str, originator: Option<&str>, args: &str) -> Result<()> {
    let decoded = decode(topic, event, originator, args)?;
    if let Some(e) = decoded.decode_error() {
        eprintln!("warning: {}", e);
    }
    println!("{:#?}", decoded);
    Ok(())
}

/// Decode a publication whose positional payload is given as JSON.
pub fn decode(topic: &str, event: &str, originator: Option<&str>, args: &str) -> Result<TopicEvent> {
    let payload = Value::from_json(args).map_err(|e| Error::InvalidPayload(e.to_string()))?;
    let args = match payload {
        Value::Array(args) => args,
        other => {
            return Err(Error::InvalidPayload(format!(
                "expected an array, found {}",
                other.kind()
            )))
        }
    };
    decode_publication(topic, event, originator, &args).ok_or_else(|| Error::NoEvent {
        topic: topic.to_string(),
        event: event.to_string(),
    })
}

#[cfg(test)]
#[path = "decode_tests.rs"]
mod tests;
