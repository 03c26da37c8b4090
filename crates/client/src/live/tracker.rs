// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Event-driven updates of live entities.
//!
//! [`track`] feeds one entity from two sources: a single `meta.last_event`
//! lookup of the last event its topic originated, answered from the
//! response cache when possible, and
//! the live subscription to the same topic. Whichever delivers first sets
//! the initial state; once a live event has arrived a late lookup answer is
//! discarded.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use wl_core::TopicEvent;

use crate::connection::Connection;
use crate::error::{Error, Result};

/// Errors buffered per entity before slow observers start skipping.
const ERROR_BUFFER: usize = 16;

/// Per-entity error fan-out for UI observers.
pub struct ErrorChannel {
    sender: broadcast::Sender<Error>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(ERROR_BUFFER);
        ErrorChannel { sender }
    }

    pub fn report(&self, error: Error) {
        warn!(%error, "live entity error");
        // No observers is fine
        let _ = self.sender.send(error);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Error> {
        self.sender.subscribe()
    }
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// A live entity driven by the events of its own topic.
pub trait Tracked: Send + Sync + 'static {
    fn topic(&self) -> String;

    /// React to one event. Events about other entities are ignored.
    fn handle(&self, event: &TopicEvent) -> Result<()>;

    fn errors(&self) -> &ErrorChannel;
}

/// Handle to a running [`track`] task. Dropping it stops tracking.
pub struct Tracker {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Tracker {
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until tracking ends, either stopped or because the connection closed.
    pub async fn finished(&mut self) {
        if let Err(e) = (&mut self.task).await {
            debug!(error = %e, "tracker task ended abnormally");
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Keep `entity` current with the events published on its topic.
pub fn track<E: Tracked>(entity: Arc<E>, connection: Arc<Connection>) -> Tracker {
    let cancel = CancellationToken::new();
    let task = tokio::spawn(run(entity, connection, cancel.clone()));
    Tracker { cancel, task }
}

async fn run<E: Tracked>(entity: Arc<E>, connection: Arc<Connection>, cancel: CancellationToken) {
    let topic = entity.topic();
    let mut stream = connection.subscribe(&topic);
    // An entity's topic is also the originator of its own events.
    let prime = connection.last_event(&topic, &topic);
    tokio::pin!(prime);
    let mut primed = false;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            result = &mut prime, if !primed => {
                primed = true;
                match result {
                    Ok(Some(event)) => deliver(entity.as_ref(), &event),
                    Ok(None) => debug!(topic, "no last event"),
                    Err(e) => entity.errors().report(e),
                }
            }
            event = stream.next() => {
                let Some(event) = event else {
                    debug!(topic, "event stream ended");
                    break;
                };
                primed = true;
                deliver(entity.as_ref(), &event);
            }
        }
    }
}

fn deliver<E: Tracked>(entity: &E, event: &TopicEvent) {
    if let Err(e) = entity.handle(event) {
        entity.errors().report(e);
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
