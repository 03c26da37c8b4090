// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WAMP v2 messages and their JSON array encoding.
//!
//! Only the client roles used here are covered: session establishment,
//! caller, and subscriber.

use wl_core::{Args, Kwargs, Value};

use crate::transport::{TransportError, TransportResult};

/// WebSocket subprotocol for JSON-serialized WAMP v2.
pub const SUBPROTOCOL: &str = "wamp.2.json";

pub const HELLO: i64 = 1;
pub const WELCOME: i64 = 2;
pub const ABORT: i64 = 3;
pub const GOODBYE: i64 = 6;
pub const ERROR: i64 = 8;
pub const SUBSCRIBE: i64 = 32;
pub const SUBSCRIBED: i64 = 33;
pub const UNSUBSCRIBE: i64 = 34;
pub const UNSUBSCRIBED: i64 = 35;
pub const EVENT: i64 = 36;
pub const CALL: i64 = 48;
pub const RESULT: i64 = 50;

/// Reason sent when the client leaves on purpose.
pub const CLOSE_NORMAL: &str = "wamp.close.normal";
/// Reply to a router-initiated GOODBYE.
pub const CLOSE_GOODBYE_AND_OUT: &str = "wamp.close.goodbye_and_out";

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Hello {
        realm: String,
        details: Kwargs,
    },
    Welcome {
        session: i64,
        details: Kwargs,
    },
    Abort {
        details: Kwargs,
        reason: String,
    },
    Goodbye {
        details: Kwargs,
        reason: String,
    },
    Error {
        request_type: i64,
        request: i64,
        details: Kwargs,
        error: String,
        args: Args,
        kwargs: Kwargs,
    },
    Subscribe {
        request: i64,
        options: Kwargs,
        topic: String,
    },
    Subscribed {
        request: i64,
        subscription: i64,
    },
    Unsubscribe {
        request: i64,
        subscription: i64,
    },
    Unsubscribed {
        request: i64,
    },
    Event {
        subscription: i64,
        publication: i64,
        details: Kwargs,
        args: Args,
        kwargs: Kwargs,
    },
    Call {
        request: i64,
        options: Kwargs,
        procedure: String,
        args: Args,
        kwargs: Kwargs,
    },
    Result {
        request: i64,
        details: Kwargs,
        args: Args,
        kwargs: Kwargs,
    },
}

/// HELLO details announcing the caller and subscriber roles.
pub fn client_roles() -> Kwargs {
    let mut roles = Kwargs::new();
    roles.insert("caller".to_string(), Value::Map(Kwargs::new()));
    roles.insert("subscriber".to_string(), Value::Map(Kwargs::new()));
    let mut details = Kwargs::new();
    details.insert("roles".to_string(), Value::Map(roles));
    details
}

impl Message {
    pub fn to_value(&self) -> Value {
        let items: Vec<Value> = match self {
            Message::Hello { realm, details } => vec![
                Value::Int(HELLO),
                Value::from(realm.as_str()),
                Value::Map(details.clone()),
            ],
            Message::Welcome { session, details } => vec![
                Value::Int(WELCOME),
                Value::Int(*session),
                Value::Map(details.clone()),
            ],
            Message::Abort { details, reason } => vec![
                Value::Int(ABORT),
                Value::Map(details.clone()),
                Value::from(reason.as_str()),
            ],
            Message::Goodbye { details, reason } => vec![
                Value::Int(GOODBYE),
                Value::Map(details.clone()),
                Value::from(reason.as_str()),
            ],
            Message::Error {
                request_type,
                request,
                details,
                error,
                args,
                kwargs,
            } => with_payload(
                vec![
                    Value::Int(ERROR),
                    Value::Int(*request_type),
                    Value::Int(*request),
                    Value::Map(details.clone()),
                    Value::from(error.as_str()),
                ],
                args,
                kwargs,
            ),
            Message::Subscribe {
                request,
                options,
                topic,
            } => vec![
                Value::Int(SUBSCRIBE),
                Value::Int(*request),
                Value::Map(options.clone()),
                Value::from(topic.as_str()),
            ],
            Message::Subscribed {
                request,
                subscription,
            } => vec![
                Value::Int(SUBSCRIBED),
                Value::Int(*request),
                Value::Int(*subscription),
            ],
            Message::Unsubscribe {
                request,
                subscription,
            } => vec![
                Value::Int(UNSUBSCRIBE),
                Value::Int(*request),
                Value::Int(*subscription),
            ],
            Message::Unsubscribed { request } => {
                vec![Value::Int(UNSUBSCRIBED), Value::Int(*request)]
            }
            Message::Event {
                subscription,
                publication,
                details,
                args,
                kwargs,
            } => with_payload(
                vec![
                    Value::Int(EVENT),
                    Value::Int(*subscription),
                    Value::Int(*publication),
                    Value::Map(details.clone()),
                ],
                args,
                kwargs,
            ),
            Message::Call {
                request,
                options,
                procedure,
                args,
                kwargs,
            } => with_payload(
                vec![
                    Value::Int(CALL),
                    Value::Int(*request),
                    Value::Map(options.clone()),
                    Value::from(procedure.as_str()),
                ],
                args,
                kwargs,
            ),
            Message::Result {
                request,
                details,
                args,
                kwargs,
            } => with_payload(
                vec![
                    Value::Int(RESULT),
                    Value::Int(*request),
                    Value::Map(details.clone()),
                ],
                args,
                kwargs,
            ),
        };
        Value::Array(items)
    }

    pub fn from_value(value: &Value) -> TransportResult<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| protocol(format!("expected message array, found {}", value.kind())))?;
        let fields = Reader { items };
        let message = match fields.int(0)? {
            HELLO => Message::Hello {
                realm: fields.string(1)?,
                details: fields.map(2)?,
            },
            WELCOME => Message::Welcome {
                session: fields.int(1)?,
                details: fields.map(2)?,
            },
            ABORT => Message::Abort {
                details: fields.map(1)?,
                reason: fields.string(2)?,
            },
            GOODBYE => Message::Goodbye {
                details: fields.map(1)?,
                reason: fields.string(2)?,
            },
            ERROR => Message::Error {
                request_type: fields.int(1)?,
                request: fields.int(2)?,
                details: fields.map(3)?,
                error: fields.string(4)?,
                args: fields.args(5)?,
                kwargs: fields.kwargs(6)?,
            },
            SUBSCRIBE => Message::Subscribe {
                request: fields.int(1)?,
                options: fields.map(2)?,
                topic: fields.string(3)?,
            },
            SUBSCRIBED => Message::Subscribed {
                request: fields.int(1)?,
                subscription: fields.int(2)?,
            },
            UNSUBSCRIBE => Message::Unsubscribe {
                request: fields.int(1)?,
                subscription: fields.int(2)?,
            },
            UNSUBSCRIBED => Message::Unsubscribed {
                request: fields.int(1)?,
            },
            EVENT => Message::Event {
                subscription: fields.int(1)?,
                publication: fields.int(2)?,
                details: fields.map(3)?,
                args: fields.args(4)?,
                kwargs: fields.kwargs(5)?,
            },
            CALL => Message::Call {
                request: fields.int(1)?,
                options: fields.map(2)?,
                procedure: fields.string(3)?,
                args: fields.args(4)?,
                kwargs: fields.kwargs(5)?,
            },
            RESULT => Message::Result {
                request: fields.int(1)?,
                details: fields.map(2)?,
                args: fields.args(3)?,
                kwargs: fields.kwargs(4)?,
            },
            other => return Err(protocol(format!("unsupported message type {}", other))),
        };
        Ok(message)
    }

    pub fn to_json(&self) -> TransportResult<String> {
        self.to_value()
            .to_json()
            .map_err(|e| protocol(e.to_string()))
    }

    pub fn from_json(text: &str) -> TransportResult<Self> {
        let value = Value::from_json(text).map_err(|e| protocol(e.to_string()))?;
        Self::from_value(&value)
    }
}

/// Append the optional payload; WAMP omits trailing empty elements.
fn with_payload(mut items: Vec<Value>, args: &Args, kwargs: &Kwargs) -> Vec<Value> {
    if !args.is_empty() || !kwargs.is_empty() {
        items.push(Value::Array(args.clone()));
    }
    if !kwargs.is_empty() {
        items.push(Value::Map(kwargs.clone()));
    }
    items
}

fn protocol(message: String) -> TransportError {
    TransportError::Protocol(message)
}

struct Reader<'a> {
    items: &'a [Value],
}

impl Reader<'_> {
    fn get(&self, index: usize) -> TransportResult<&Value> {
        self.items
            .get(index)
            .ok_or_else(|| protocol(format!("missing message element {}", index)))
    }

    fn int(&self, index: usize) -> TransportResult<i64> {
        let value = self.get(index)?;
        value
            .as_i64()
            .ok_or_else(|| protocol(format!("element {}: expected integer, found {}", index, value.kind())))
    }

    fn string(&self, index: usize) -> TransportResult<String> {
        let value = self.get(index)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| protocol(format!("element {}: expected string, found {}", index, value.kind())))
    }

    fn map(&self, index: usize) -> TransportResult<Kwargs> {
        let value = self.get(index)?;
        value
            .as_map()
            .cloned()
            .ok_or_else(|| protocol(format!("element {}: expected object, found {}", index, value.kind())))
    }

    /// Optional trailing positional payload.
    fn args(&self, index: usize) -> TransportResult<Args> {
        match self.items.get(index) {
            None => Ok(Args::new()),
            Some(value) => value
                .as_array()
                .map(<[Value]>::to_vec)
                .ok_or_else(|| protocol(format!("element {}: expected array, found {}", index, value.kind()))),
        }
    }

    /// Optional trailing keyword payload.
    fn kwargs(&self, index: usize) -> TransportResult<Kwargs> {
        match self.items.get(index) {
            None => Ok(Kwargs::new()),
            Some(_) => self.map(index),
        }
    }
}

#[cfg(test)]
#[path = "wamp_tests.rs"]
mod tests;
