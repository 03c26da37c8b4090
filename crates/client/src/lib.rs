// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! wl-client: live transit entities kept in sync with a WAMP router.
//!
//! The [`ConnectionPool`] owns self-healing sessions, one per endpoint.
//! Calls and subscriptions on a [`Connection`] survive reconnects and share
//! a per-connection [`ResponseCache`] of last events. Live entities obtained
//! from a [`Client`] are reconciled in place from snapshots and events, so
//! anything holding one keeps seeing current data.

pub mod cache;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod live;
pub mod reachability;
pub mod retry;
pub mod status;
pub mod transport;
pub mod wamp;
pub mod websocket;

#[cfg(test)]
mod testing;

pub use cache::ResponseCache;
pub use client::{schedule_time, Client};
pub use config::{AgencyConfig, ClientConfig, ConnectionSettings, ServerConfig};
pub use connection::{Connection, ConnectionConfig, ConnectionPool, Endpoint, EventStream, SessionState};
pub use error::{Error, Result};
pub use live::{
    track, ErrorChannel, LiveRoute, LiveStation, LiveVehicle, Property, Reconcile, Registry,
    Tracked, Tracker,
};
pub use reachability::{AssumeReachable, Reachability, ResolveReachability};
pub use retry::RetryPolicy;
pub use status::{BroadcastStatus, NoopStatus, RecordingStatus, StatusMessage, StatusSink};
pub use transport::{Session, Transport, TransportError};
pub use websocket::WebSocketTransport;
