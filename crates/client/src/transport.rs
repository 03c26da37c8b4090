// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the routed RPC and pub/sub session.
//!
//! Provides a trait-based boundary so that:
//! - the WAMP WebSocket session serves production traffic
//! - mock sessions drive connection and reconciliation tests

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::mpsc;
use wl_core::{Args, Kwargs};

use crate::connection::Endpoint;

/// Error type for transport operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Session could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Session closed while the operation was in flight.
    #[error("connection closed")]
    ConnectionClosed,

    /// The router or callee answered with an application error.
    #[error("{error}: {message}")]
    Remote { error: String, message: String },

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The peer sent something that is not a valid protocol message.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Positional and keyword results of a procedure call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallResult {
    pub args: Args,
    pub kwargs: Kwargs,
}

/// One message delivered on a subscribed topic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Publication {
    pub args: Args,
    pub kwargs: Kwargs,
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Closed on purpose by either side. No reconnection follows.
    Graceful(String),
    /// Dropped by the network or the router.
    Lost(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Graceful(reason) => write!(f, "closed ({})", reason),
            CloseReason::Lost(reason) => write!(f, "lost ({})", reason),
        }
    }
}

/// A live topic subscription.
///
/// Publications arrive in order until the session ends. Dropping the
/// subscription unsubscribes.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<Publication>,
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        receiver: mpsc::UnboundedReceiver<Publication>,
        on_drop: impl FnOnce() + Send + 'static,
    ) -> Self {
        Subscription {
            receiver,
            on_drop: Some(Box::new(on_drop)),
        }
    }

    /// Next publication, or `None` once the session has ended.
    pub async fn next(&mut self) -> Option<Publication> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.on_drop.take() {
            unsubscribe();
        }
    }
}

/// An established session with the router.
pub trait Session: Send + Sync {
    /// Invoke a remote procedure.
    fn call(
        &self,
        procedure: &str,
        args: Args,
        kwargs: Kwargs,
    ) -> BoxFuture<'_, TransportResult<CallResult>>;

    /// Subscribe to a topic.
    fn subscribe(&self, topic: &str) -> BoxFuture<'_, TransportResult<Subscription>>;

    /// Close the session on purpose.
    fn disconnect(&self) -> BoxFuture<'_, TransportResult<()>>;

    /// Resolves once the session has ended, for whatever reason.
    fn closed(&self) -> BoxFuture<'_, CloseReason>;
}

/// Opens sessions against an endpoint.
pub trait Transport: Send + Sync {
    fn connect(&self, endpoint: &Endpoint) -> BoxFuture<'_, TransportResult<Arc<dyn Session>>>;
}
