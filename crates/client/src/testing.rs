// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scriptable in-memory transport shared by the crate's tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch, Notify};
use wl_core::event::{EVENT_KEY, ORIGINATOR_KEY};
use wl_core::{Args, Kwargs, Value};

use crate::connection::{ConnectionConfig, ConnectionPool, Endpoint};
use crate::reachability::Reachability;
use crate::transport::{
    CallResult, CloseReason, Publication, Session, Subscription, Transport, TransportError,
    TransportResult,
};

/// What the next `connect` does.
#[derive(Debug, Clone, Copy)]
pub enum ConnectOutcome {
    Accept,
    Refuse,
    Hang,
}

/// A scripted procedure reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Result(CallResult),
    Error(&'static str),
    /// Never answers; fails once the session closes.
    Hang,
    /// Answers once the gate is notified.
    Held(Arc<Notify>, CallResult),
}

impl Reply {
    pub fn args(args: Args) -> Self {
        Reply::Result(CallResult {
            args,
            kwargs: Kwargs::new(),
        })
    }

    pub fn kwargs(kwargs: Kwargs) -> Self {
        Reply::Result(CallResult {
            args: Args::new(),
            kwargs,
        })
    }

    pub fn held(gate: &Arc<Notify>, kwargs: Kwargs) -> Self {
        Reply::Held(
            Arc::clone(gate),
            CallResult {
                args: Args::new(),
                kwargs,
            },
        )
    }
}

type Replies = Arc<Mutex<HashMap<String, VecDeque<Reply>>>>;

#[derive(Default)]
struct Shared {
    connects: u32,
    plan: VecDeque<ConnectOutcome>,
    sessions: Vec<Arc<MockSession>>,
}

/// Transport whose sessions live in memory.
///
/// Replies are queued per procedure; the last queued reply repeats.
#[derive(Clone, Default)]
pub struct MockTransport {
    shared: Arc<Mutex<Shared>>,
    replies: Replies,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome of upcoming connects. Unscripted connects succeed.
    pub fn plan(&self, outcomes: impl IntoIterator<Item = ConnectOutcome>) {
        self.shared.lock().plan.extend(outcomes);
    }

    pub fn reply(&self, procedure: &str, reply: Reply) {
        self.replies
            .lock()
            .entry(procedure.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn connects(&self) -> u32 {
        self.shared.lock().connects
    }

    pub fn sessions(&self) -> usize {
        self.shared.lock().sessions.len()
    }

    pub fn session(&self, index: usize) -> Arc<MockSession> {
        Arc::clone(&self.shared.lock().sessions[index])
    }

    pub fn last_session(&self) -> Arc<MockSession> {
        Arc::clone(self.shared.lock().sessions.last().unwrap())
    }
}

impl Transport for MockTransport {
    fn connect(&self, _endpoint: &Endpoint) -> BoxFuture<'_, TransportResult<Arc<dyn Session>>> {
        Box::pin(async move {
            let outcome = {
                let mut shared = self.shared.lock();
                shared.connects += 1;
                shared.plan.pop_front().unwrap_or(ConnectOutcome::Accept)
            };
            match outcome {
                ConnectOutcome::Accept => {
                    let session = Arc::new(MockSession::new(Arc::clone(&self.replies)));
                    self.shared.lock().sessions.push(Arc::clone(&session));
                    Ok(session as Arc<dyn Session>)
                }
                ConnectOutcome::Refuse => {
                    Err(TransportError::ConnectionFailed("refused".to_string()))
                }
                ConnectOutcome::Hang => std::future::pending().await,
            }
        })
    }
}

/// One in-memory session.
pub struct MockSession {
    replies: Replies,
    calls: Mutex<Vec<(String, Args)>>,
    subscribers: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Publication>>>>,
    unsubscribes: Arc<Mutex<Vec<String>>>,
    closed: watch::Sender<Option<CloseReason>>,
}

impl MockSession {
    fn new(replies: Replies) -> Self {
        let (closed, _) = watch::channel(None);
        MockSession {
            replies,
            calls: Mutex::new(Vec::new()),
            subscribers: Mutex::new(HashMap::new()),
            unsubscribes: Arc::new(Mutex::new(Vec::new())),
            closed,
        }
    }

    pub fn calls(&self) -> Vec<(String, Args)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, procedure: &str) -> usize {
        self.calls.lock().iter().filter(|(p, _)| p == procedure).count()
    }

    /// Deliver a publication to every subscriber of `topic`.
    pub fn publish(&self, topic: &str, args: Args, kwargs: Kwargs) -> usize {
        let mut subscribers = self.subscribers.lock();
        let Some(senders) = subscribers.get_mut(topic) else {
            return 0;
        };
        senders.retain(|tx| {
            tx.send(Publication {
                args: args.clone(),
                kwargs: kwargs.clone(),
            })
            .is_ok()
        });
        senders.len()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers
            .lock()
            .get(topic)
            .map_or(0, |senders| senders.iter().filter(|tx| !tx.is_closed()).count())
    }

    pub fn unsubscribes(&self) -> Vec<String> {
        self.unsubscribes.lock().clone()
    }

    /// End the session, completing its subscriptions.
    pub fn close(&self, reason: CloseReason) {
        self.closed.send_replace(Some(reason));
        self.subscribers.lock().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.borrow().is_some()
    }

    async fn wait_closed(&self) -> CloseReason {
        let mut closed = self.closed.subscribe();
        loop {
            let current = closed.borrow_and_update().clone();
            if let Some(reason) = current {
                return reason;
            }
            if closed.changed().await.is_err() {
                return CloseReason::Lost("session dropped".to_string());
            }
        }
    }

    fn next_reply(&self, procedure: &str) -> Option<Reply> {
        let mut replies = self.replies.lock();
        let queue = replies.get_mut(procedure)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Session for MockSession {
    fn call(
        &self,
        procedure: &str,
        args: Args,
        _kwargs: Kwargs,
    ) -> BoxFuture<'_, TransportResult<CallResult>> {
        let procedure = procedure.to_string();
        Box::pin(async move {
            if self.is_closed() {
                return Err(TransportError::ConnectionClosed);
            }
            self.calls.lock().push((procedure.clone(), args));
            match self.next_reply(&procedure) {
                Some(Reply::Result(result)) => Ok(result),
                Some(Reply::Error(error)) => Err(TransportError::Remote {
                    error: error.to_string(),
                    message: "scripted failure".to_string(),
                }),
                Some(Reply::Hang) => {
                    self.wait_closed().await;
                    Err(TransportError::ConnectionClosed)
                }
                Some(Reply::Held(gate, result)) => {
                    gate.notified().await;
                    Ok(result)
                }
                None => Err(TransportError::Remote {
                    error: "wamp.error.no_such_procedure".to_string(),
                    message: procedure,
                }),
            }
        })
    }

    fn subscribe(&self, topic: &str) -> BoxFuture<'_, TransportResult<Subscription>> {
        let topic = topic.to_string();
        Box::pin(async move {
            if self.is_closed() {
                return Err(TransportError::ConnectionClosed);
            }
            let (tx, rx) = mpsc::unbounded_channel();
            self.subscribers
                .lock()
                .entry(topic.clone())
                .or_default()
                .push(tx);
            let unsubscribes = Arc::clone(&self.unsubscribes);
            Ok(Subscription::new(rx, move || unsubscribes.lock().push(topic)))
        })
    }

    fn disconnect(&self) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            self.close(CloseReason::Graceful("disconnect".to_string()));
            Ok(())
        })
    }

    fn closed(&self) -> BoxFuture<'_, CloseReason> {
        Box::pin(self.wait_closed())
    }
}

/// Reachability with a fixed answer.
pub struct FixedReachability(pub bool);

impl Reachability for FixedReachability {
    fn is_reachable<'a>(&'a self, _endpoint: &'a Endpoint) -> BoxFuture<'a, bool> {
        let reachable = self.0;
        Box::pin(async move { reachable })
    }
}

pub fn endpoint() -> Endpoint {
    Endpoint {
        url: "ws://transit.test/ws".to_string(),
        realm: "realm1".to_string(),
        schedule_service: "schedule".to_string(),
    }
}

pub fn pool(transport: &MockTransport) -> ConnectionPool {
    ConnectionPool::new(Arc::new(transport.clone()))
        .with_config(ConnectionConfig::default())
        .with_reachability(Arc::new(FixedReachability(true)))
}

/// Publication kwargs naming the event and its originator.
pub fn header(event: &str, originator: &str) -> Kwargs {
    let mut kwargs = Kwargs::new();
    kwargs.insert(EVENT_KEY.to_string(), Value::from(event));
    kwargs.insert(ORIGINATOR_KEY.to_string(), Value::from(originator));
    kwargs
}

/// Poll `condition` until it holds, letting background tasks run.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..5_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(condition(), "condition never became true");
}
