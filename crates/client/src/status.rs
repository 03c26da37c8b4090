// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing connection status notifications.
//!
//! The connection publishes a status message while it is degraded and
//! `None` once it has recovered. What a sink does with them (banner, log
//! line, nothing) is up to the embedding application.

use parking_lot::Mutex;
use tokio::sync::broadcast;

/// A degraded-connection condition worth showing to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    /// The session dropped and is being re-established.
    Reconnecting,
    /// A request timed out and is being retried.
    RequestRetrying,
}

impl StatusMessage {
    pub fn text(&self) -> &'static str {
        match self {
            StatusMessage::Reconnecting => "Connection interrupted. Reconnecting…",
            StatusMessage::RequestRetrying => "Request timed out. Retrying…",
        }
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Receives status changes. `None` clears the current status.
pub trait StatusSink: Send + Sync {
    fn publish(&self, status: Option<StatusMessage>);
}

/// Discards all status changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStatus;

impl StatusSink for NoopStatus {
    fn publish(&self, _status: Option<StatusMessage>) {}
}

/// Keeps every status change, in order.
#[derive(Debug, Default)]
pub struct RecordingStatus {
    history: Mutex<Vec<Option<StatusMessage>>>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Option<StatusMessage>> {
        self.history.lock().clone()
    }

    /// The most recent status, `None` if cleared or never set.
    pub fn current(&self) -> Option<StatusMessage> {
        self.history.lock().last().copied().flatten()
    }
}

impl StatusSink for RecordingStatus {
    fn publish(&self, status: Option<StatusMessage>) {
        self.history.lock().push(status);
    }
}

/// Fans status changes out to any number of listeners.
#[derive(Debug, Clone)]
pub struct BroadcastStatus {
    sender: broadcast::Sender<Option<StatusMessage>>,
}

impl BroadcastStatus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        BroadcastStatus { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Option<StatusMessage>> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for BroadcastStatus {
    fn publish(&self, status: Option<StatusMessage>) {
        // No listeners is fine.
        let _ = self.sender.send(status);
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
