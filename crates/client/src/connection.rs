// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection management for router sessions.
//!
//! A [`ConnectionPool`] hands out one [`Connection`] per endpoint. Each
//! connection owns a background task that opens a session and reopens it
//! whenever it is lost, so callers never see transient drops:
//!
//! - [`Connection::call`] waits for a session, times the request out, and
//!   retries until it succeeds. `meta.last_event` calls are answered from the
//!   response cache when possible.
//! - [`Connection::subscribe`] shares one router subscription per topic
//!   between all streams, re-subscribing after every reconnect. Every event
//!   that flows through is stored in the response cache and queued for each
//!   stream, so a slow reader sees every event in order.
//!
//! A session closed on purpose ends the connection: pending calls fail with
//! [`Error::ConnectionLost`] and streams complete.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use wl_core::{
    decode_call_result, decode_publication_kwargs, last_event_request, Args, Kwargs, Procedures,
    TopicEvent, Value,
};

use crate::cache::{ResponseCache, DEFAULT_CAPACITY};
use crate::error::{Error, Result};
use crate::reachability::{Reachability, ResolveReachability};
use crate::retry::RetryPolicy;
use crate::status::{NoopStatus, StatusMessage, StatusSink};
use crate::transport::{CloseReason, Session, Transport, TransportError};

/// Where to connect. Two equal endpoints share one connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub url: String,
    pub realm: String,
    /// Service answering schedule lookups.
    pub schedule_service: String,
}

impl Endpoint {
    /// Stable hash of the endpoint, for logs and external bookkeeping.
    ///
    /// Not unique: the pool compares whole endpoints.
    pub fn key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Timing for a connection and its requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub request_timeout: Duration,
    pub request_retry: RetryPolicy,
    pub connect_timeout: Duration,
    pub reconnect: RetryPolicy,
    pub cache_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            request_timeout: Duration::from_secs(10),
            request_retry: RetryPolicy::unbounded(Duration::from_millis(500)),
            connect_timeout: Duration::from_secs(10),
            reconnect: RetryPolicy::unbounded(Duration::from_secs(1)),
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Lifecycle of a connection's session.
#[derive(Clone)]
pub enum SessionState {
    Connecting,
    Connected(Arc<dyn Session>),
    /// Terminal. Carries the error that ended reconnection, if any.
    Closed(Option<Error>),
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Connecting => f.write_str("Connecting"),
            SessionState::Connected(_) => f.write_str("Connected"),
            SessionState::Closed(error) => f.debug_tuple("Closed").field(error).finish(),
        }
    }
}

/// Hands out shared connections, one per endpoint.
pub struct ConnectionPool {
    transport: Arc<dyn Transport>,
    reachability: Arc<dyn Reachability>,
    status: Arc<dyn StatusSink>,
    config: ConnectionConfig,
    connections: Mutex<HashMap<Endpoint, Arc<Connection>>>,
}

impl ConnectionPool {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        ConnectionPool {
            transport,
            reachability: Arc::new(ResolveReachability),
            status: Arc::new(NoopStatus),
            config: ConnectionConfig::default(),
            connections: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    pub fn with_reachability(mut self, reachability: Arc<dyn Reachability>) -> Self {
        self.reachability = reachability;
        self
    }

    /// The connection for `endpoint`, reusing a live one if it exists.
    ///
    /// Must be called within a tokio runtime.
    pub fn connect(&self, endpoint: &Endpoint) -> Arc<Connection> {
        let mut connections = self.connections.lock();
        connections.retain(|_, connection| !connection.is_closed());
        if let Some(existing) = connections.get(endpoint) {
            trace!(url = %endpoint.url, "reusing connection");
            return Arc::clone(existing);
        }

        let connection = Connection::spawn(
            endpoint.clone(),
            self.config.clone(),
            Arc::clone(&self.transport),
            Arc::clone(&self.reachability),
            Arc::clone(&self.status),
        );
        connections.insert(endpoint.clone(), Arc::clone(&connection));
        connection
    }

    /// Number of connections that have not closed.
    pub fn len(&self) -> usize {
        self.connections
            .lock()
            .values()
            .filter(|c| !c.is_closed())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close every connection.
    pub fn shutdown(&self) {
        for (_, connection) in self.connections.lock().drain() {
            connection.close();
        }
    }
}

/// A self-healing session with one endpoint.
pub struct Connection {
    endpoint: Endpoint,
    config: ConnectionConfig,
    cache: Arc<ResponseCache>,
    status: Arc<dyn StatusSink>,
    state: watch::Sender<SessionState>,
    topics: Mutex<HashMap<String, TopicFanout>>,
    generations: AtomicU64,
    cancel: CancellationToken,
}

/// Shared router subscription for one topic, with a queue per stream.
struct TopicFanout {
    streams: HashMap<u64, mpsc::UnboundedSender<TopicEvent>>,
    generation: u64,
    cancel: CancellationToken,
}

impl Connection {
    fn spawn(
        endpoint: Endpoint,
        config: ConnectionConfig,
        transport: Arc<dyn Transport>,
        reachability: Arc<dyn Reachability>,
        status: Arc<dyn StatusSink>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::Connecting);
        let connection = Arc::new(Connection {
            cache: Arc::new(ResponseCache::new(config.cache_capacity)),
            endpoint,
            config,
            status,
            state,
            topics: Mutex::new(HashMap::new()),
            generations: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        });
        tokio::spawn(Arc::clone(&connection).maintain_session(transport, reachability));
        connection
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Connected(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Closed(_))
    }

    /// Close the session on purpose. Streams complete and calls fail.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Wait for an open session.
    pub async fn session(&self) -> Result<Arc<dyn Session>> {
        let mut state = self.state.subscribe();
        loop {
            let current = state.borrow_and_update().clone();
            match current {
                SessionState::Connected(session) => return Ok(session),
                SessionState::Closed(Some(error)) => return Err(error),
                SessionState::Closed(None) => {
                    return Err(Error::ConnectionLost {
                        reason: "connection closed".to_string(),
                    })
                }
                SessionState::Connecting => {}
            }
            if state.changed().await.is_err() {
                return Err(Error::ConnectionLost {
                    reason: "connection dropped".to_string(),
                });
            }
        }
    }

    /// Open sessions until closed on purpose or out of attempts.
    async fn maintain_session(
        self: Arc<Self>,
        transport: Arc<dyn Transport>,
        reachability: Arc<dyn Reachability>,
    ) {
        let mut failures = 0u32;
        let mut interrupted = false;

        loop {
            self.state.send_replace(SessionState::Connecting);
            let result = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = self.open_session(transport.as_ref(), reachability.as_ref()) => result,
            };

            match result {
                Ok(session) => {
                    failures = 0;
                    info!(url = %self.endpoint.url, realm = %self.endpoint.realm, "session established");
                    self.state
                        .send_replace(SessionState::Connected(Arc::clone(&session)));
                    if interrupted {
                        interrupted = false;
                        self.status.publish(None);
                    }

                    let reason = tokio::select! {
                        _ = self.cancel.cancelled() => {
                            if let Err(e) = session.disconnect().await {
                                debug!(error = %e, "disconnect failed");
                            }
                            break;
                        }
                        reason = session.closed() => reason,
                    };

                    match reason {
                        CloseReason::Graceful(reason) => {
                            info!(url = %self.endpoint.url, %reason, "session closed");
                            break;
                        }
                        CloseReason::Lost(reason) => {
                            warn!(url = %self.endpoint.url, %reason, "session lost, reconnecting");
                            self.state.send_replace(SessionState::Connecting);
                        }
                    }
                }
                Err(error) => {
                    failures = failures.saturating_add(1);
                    warn!(url = %self.endpoint.url, attempt = failures, %error, "connection attempt failed");
                    if !self.config.reconnect.allows(failures) {
                        if interrupted {
                            self.status.publish(None);
                        }
                        self.state.send_replace(SessionState::Closed(Some(error)));
                        return;
                    }
                }
            }

            if !interrupted {
                interrupted = true;
                self.status.publish(Some(StatusMessage::Reconnecting));
            }
            if !self.config.reconnect.wait(&self.cancel).await {
                break;
            }
        }

        if interrupted {
            self.status.publish(None);
        }
        self.state.send_replace(SessionState::Closed(None));
    }

    async fn open_session(
        &self,
        transport: &dyn Transport,
        reachability: &dyn Reachability,
    ) -> Result<Arc<dyn Session>> {
        match timeout(self.config.connect_timeout, transport.connect(&self.endpoint)).await {
            Ok(Ok(session)) => Ok(session),
            Ok(Err(e)) => Err(Error::ConnectionLost {
                reason: e.to_string(),
            }),
            Err(_) => {
                if reachability.is_reachable(&self.endpoint).await {
                    Err(Error::Timeout {
                        context: "connect".to_string(),
                    })
                } else {
                    Err(Error::Unreachable)
                }
            }
        }
    }

    /// Call `procedure` and decode its result.
    ///
    /// Timed-out requests are retried after the retry delay, with a status
    /// message shown until one succeeds. Requests interrupted by a lost
    /// session are retried once the session is back. Unknown procedures
    /// decode to `None`.
    pub async fn call(&self, procedure: &str, args: Args, kwargs: Kwargs) -> Result<Option<TopicEvent>> {
        let is_last_event = procedure == Procedures::META_LAST_EVENT;
        if is_last_event {
            if let Some((topic, originator)) = last_event_request(&args) {
                if let Some(event) = self.cache.lookup(originator, topic) {
                    trace!(topic, originator, "last event served from cache");
                    return Ok(Some(event));
                }
            }
        }

        let mut attempts = 0u32;
        let mut retrying = false;
        let result = loop {
            attempts = attempts.saturating_add(1);
            let session = match self.session().await {
                Ok(session) => session,
                Err(e) => break Err(e),
            };
            let outcome = timeout(
                self.config.request_timeout,
                session.call(procedure, args.clone(), kwargs.clone()),
            )
            .await;

            match outcome {
                Ok(Ok(reply)) => {
                    break Ok(decode_call_result(
                        procedure,
                        &args,
                        &self.endpoint.schedule_service,
                        &reply.args,
                        &reply.kwargs,
                    ))
                }
                Ok(Err(TransportError::ConnectionClosed)) => {
                    debug!(procedure, "session closed during call, retrying");
                }
                Ok(Err(e)) => {
                    break Err(Error::Transport {
                        target: procedure.to_string(),
                        message: e.to_string(),
                    })
                }
                Err(_) => {
                    warn!(procedure, attempt = attempts, "request timed out");
                    if !retrying {
                        retrying = true;
                        self.status.publish(Some(StatusMessage::RequestRetrying));
                    }
                }
            }

            if !self.config.request_retry.allows(attempts) {
                break Err(Error::Timeout {
                    context: procedure.to_string(),
                });
            }
            if !self.config.request_retry.wait(&self.cancel).await {
                break Err(Error::ConnectionLost {
                    reason: "connection closed".to_string(),
                });
            }
        };

        if retrying {
            self.status.publish(None);
        }
        let event = result?;
        if is_last_event {
            if let Some(event) = &event {
                self.cache.store(event.clone());
            }
        }
        Ok(event)
    }

    /// Replay the last event `originator` published on `topic`.
    pub async fn last_event(&self, topic: &str, originator: &str) -> Result<Option<TopicEvent>> {
        self.call(
            Procedures::META_LAST_EVENT,
            vec![Value::from(topic), Value::from(originator)],
            Kwargs::new(),
        )
        .await
    }

    /// Stream decoded events published on `topic`.
    ///
    /// The stream ends when the connection closes. Dropping the last stream
    /// of a topic unsubscribes and schedules its cached events for removal.
    pub fn subscribe(self: &Arc<Self>, topic: &str) -> EventStream {
        let mut topics = self.topics.lock();
        let fanout = topics.entry(topic.to_string()).or_insert_with(|| {
            let generation = self.generations.fetch_add(1, Ordering::Relaxed);
            let cancel = self.cancel.child_token();
            tokio::spawn(Arc::clone(self).pump_topic(
                topic.to_string(),
                generation,
                cancel.clone(),
            ));
            TopicFanout {
                streams: HashMap::new(),
                generation,
                cancel,
            }
        });
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.generations.fetch_add(1, Ordering::Relaxed);
        fanout.streams.insert(id, sender);
        self.cache.retain(topic);

        EventStream {
            receiver,
            guard: StreamGuard {
                connection: Arc::clone(self),
                topic: topic.to_string(),
                generation: fanout.generation,
                id,
            },
        }
    }

    /// Number of topics with at least one open stream.
    pub fn subscribed_topics(&self) -> usize {
        self.topics.lock().len()
    }

    async fn pump_topic(self: Arc<Self>, topic: String, generation: u64, cancel: CancellationToken) {
        self.forward_topic(&topic, generation, &cancel).await;
        // Released topics are already gone; anything else ends its streams here.
        let mut topics = self.topics.lock();
        if topics.get(&topic).is_some_and(|f| f.generation == generation) {
            topics.remove(&topic);
        }
        drop(topics);
        debug!(topic, "topic stream finished");
    }

    /// Forward publications to the topic's streams across reconnects until
    /// cancelled or the connection closes.
    async fn forward_topic(&self, topic: &str, generation: u64, cancel: &CancellationToken) {
        loop {
            let session = tokio::select! {
                _ = cancel.cancelled() => return,
                session = self.session() => session,
            };
            let Ok(session) = session else { return };

            let subscription = tokio::select! {
                _ = cancel.cancelled() => return,
                subscription = session.subscribe(topic) => subscription,
            };
            let mut subscription = match subscription {
                Ok(subscription) => subscription,
                Err(e) => {
                    warn!(topic, error = %e, "subscribe failed");
                    if !self.config.request_retry.wait(cancel).await {
                        return;
                    }
                    continue;
                }
            };
            debug!(topic, "subscribed");

            loop {
                let publication = tokio::select! {
                    _ = cancel.cancelled() => return,
                    publication = subscription.next() => publication,
                };
                let Some(publication) = publication else { break };
                match decode_publication_kwargs(topic, &publication.args, &publication.kwargs) {
                    Some(event) => {
                        self.cache.store(event.clone());
                        self.fan_out(topic, generation, &event);
                    }
                    None => trace!(topic, "ignoring unrecognized publication"),
                }
            }
            debug!(topic, "subscription ended");
        }
    }

    fn fan_out(&self, topic: &str, generation: u64, event: &TopicEvent) {
        let topics = self.topics.lock();
        let Some(fanout) = topics.get(topic).filter(|f| f.generation == generation) else {
            return;
        };
        for sender in fanout.streams.values() {
            // A closed queue belongs to a stream that is being dropped.
            let _ = sender.send(event.clone());
        }
    }

    fn release(&self, topic: &str, generation: u64, id: u64) {
        let mut topics = self.topics.lock();
        let Some(fanout) = topics.get_mut(topic) else {
            return;
        };
        if fanout.generation != generation {
            return;
        }
        fanout.streams.remove(&id);
        if !fanout.streams.is_empty() {
            return;
        }
        if let Some(fanout) = topics.remove(topic) {
            fanout.cancel.cancel();
        }
        drop(topics);
        trace!(topic, "last stream released");
        self.cache.expire(topic);
    }
}

/// Decoded events published on one topic.
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<TopicEvent>,
    guard: StreamGuard,
}

struct StreamGuard {
    connection: Arc<Connection>,
    topic: String,
    generation: u64,
    id: u64,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.connection.release(&self.topic, self.generation, self.id);
    }
}

impl EventStream {
    pub fn topic(&self) -> &str {
        &self.guard.topic
    }

    /// Next event, or `None` once the connection has closed.
    ///
    /// Events queue up until read; none are skipped.
    pub async fn next(&mut self) -> Option<TopicEvent> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
