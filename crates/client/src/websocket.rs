// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WAMP sessions over tokio-tungstenite WebSockets.
//!
//! Each session runs two tasks: a writer draining an outgoing queue into the
//! socket, and a reader dispatching router messages to pending calls,
//! pending subscribes, and subscription channels. When the reader stops,
//! every pending request fails with `ConnectionClosed` and every
//! subscription ends.
//!
//! A subscribe abandoned before the router acknowledged it is unsubscribed
//! as soon as the late SUBSCRIBED arrives.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message as Frame;
use tracing::{debug, trace, warn};
use wl_core::{Args, Kwargs};

use crate::connection::Endpoint;
use crate::transport::{
    CallResult, CloseReason, Publication, Session, Subscription, Transport, TransportError,
    TransportResult,
};
use crate::wamp::{self, Message};

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Opens WAMP sessions over WebSockets.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        WebSocketTransport
    }
}

impl Transport for WebSocketTransport {
    fn connect(&self, endpoint: &Endpoint) -> BoxFuture<'_, TransportResult<Arc<dyn Session>>> {
        let endpoint = endpoint.clone();
        Box::pin(async move {
            let mut request = endpoint
                .url
                .as_str()
                .into_client_request()
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
            request.headers_mut().insert(
                "Sec-WebSocket-Protocol",
                HeaderValue::from_static(wamp::SUBPROTOCOL),
            );

            let (mut ws, _) = tokio_tungstenite::connect_async(request)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let session = join_realm(&mut ws, &endpoint.realm).await?;
            debug!(url = %endpoint.url, session, "joined realm");
            Ok(WampSession::start(ws) as Arc<dyn Session>)
        })
    }
}

/// Send HELLO and wait for WELCOME.
async fn join_realm(ws: &mut WsStream, realm: &str) -> TransportResult<i64> {
    let hello = Message::Hello {
        realm: realm.to_string(),
        details: wamp::client_roles(),
    };
    ws.send(Frame::Text(hello.to_json()?.into()))
        .await
        .map_err(|e| TransportError::SendFailed(e.to_string()))?;

    loop {
        match ws.next().await {
            Some(Ok(Frame::Text(text))) => match Message::from_json(&text)? {
                Message::Welcome { session, .. } => return Ok(session),
                Message::Abort { reason, .. } => {
                    return Err(TransportError::ConnectionFailed(reason))
                }
                other => {
                    return Err(TransportError::Protocol(format!(
                        "expected WELCOME, got {:?}",
                        other
                    )))
                }
            },
            Some(Ok(Frame::Close(_))) | None => return Err(TransportError::ConnectionClosed),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(TransportError::ConnectionFailed(e.to_string())),
        }
    }
}

type PendingCall = oneshot::Sender<TransportResult<CallResult>>;
type PendingSubscribe = (
    oneshot::Sender<TransportResult<i64>>,
    mpsc::UnboundedSender<Publication>,
);

#[derive(Default)]
struct Routing {
    calls: HashMap<i64, PendingCall>,
    subscribes: HashMap<i64, PendingSubscribe>,
    subscriptions: HashMap<i64, mpsc::UnboundedSender<Publication>>,
    /// Acknowledged subscriptions nobody waits for, unsubscribed once no
    /// subscribe is pending that could resolve to the same id.
    abandoned: HashSet<i64>,
}

impl Routing {
    fn release_abandoned(&mut self, requests: &AtomicI64) -> Vec<Message> {
        if !self.subscribes.is_empty() {
            return Vec::new();
        }
        self.abandoned
            .drain()
            .map(|subscription| {
                debug!(subscription, "unsubscribing abandoned subscription");
                Message::Unsubscribe {
                    request: requests.fetch_add(1, Ordering::Relaxed),
                    subscription,
                }
            })
            .collect()
    }
}

struct WampSession {
    outgoing: mpsc::UnboundedSender<Message>,
    requests: Arc<AtomicI64>,
    routing: Arc<Mutex<Routing>>,
    closed: watch::Sender<Option<CloseReason>>,
}

impl WampSession {
    fn start(ws: WsStream) -> Arc<Self> {
        let (sink, stream) = ws.split();
        let (outgoing, queue) = mpsc::unbounded_channel();
        let session = Arc::new(WampSession::new(outgoing));

        tokio::spawn(write_frames(sink, queue));
        tokio::spawn(read_frames(
            stream,
            Arc::clone(&session.routing),
            Arc::clone(&session.requests),
            session.outgoing.clone(),
            session.closed.clone(),
        ));
        session
    }

    fn new(outgoing: mpsc::UnboundedSender<Message>) -> Self {
        let (closed, _) = watch::channel(None);
        WampSession {
            outgoing,
            requests: Arc::new(AtomicI64::new(1)),
            routing: Arc::new(Mutex::new(Routing::default())),
            closed,
        }
    }

    fn next_request(&self) -> i64 {
        self.requests.fetch_add(1, Ordering::Relaxed)
    }

    fn send(&self, message: Message) -> TransportResult<()> {
        self.outgoing
            .send(message)
            .map_err(|_| TransportError::ConnectionClosed)
    }

    fn is_closed(&self) -> bool {
        self.closed.borrow().is_some()
    }
}

impl Session for WampSession {
    fn call(
        &self,
        procedure: &str,
        args: Args,
        kwargs: Kwargs,
    ) -> BoxFuture<'_, TransportResult<CallResult>> {
        let procedure = procedure.to_string();
        Box::pin(async move {
            if self.is_closed() {
                return Err(TransportError::ConnectionClosed);
            }
            let request = self.next_request();
            let (tx, rx) = oneshot::channel();
            self.routing.lock().calls.insert(request, tx);
            // Dropping this future abandons the call; forget its slot.
            let routing = Arc::clone(&self.routing);
            let _forget = ForgetOnDrop(move || {
                routing.lock().calls.remove(&request);
            });

            trace!(request, %procedure, "CALL");
            self.send(Message::Call {
                request,
                options: Kwargs::new(),
                procedure,
                args,
                kwargs,
            })?;
            rx.await.map_err(|_| TransportError::ConnectionClosed)?
        })
    }

    fn subscribe(&self, topic: &str) -> BoxFuture<'_, TransportResult<Subscription>> {
        let topic = topic.to_string();
        Box::pin(async move {
            if self.is_closed() {
                return Err(TransportError::ConnectionClosed);
            }
            let request = self.next_request();
            let (ack_tx, ack_rx) = oneshot::channel();
            let (events_tx, events_rx) = mpsc::unbounded_channel();
            self.routing
                .lock()
                .subscribes
                .insert(request, (ack_tx, events_tx));
            let routing = Arc::clone(&self.routing);
            let _forget = ForgetOnDrop(move || {
                routing.lock().subscribes.remove(&request);
            });
            trace!(request, %topic, "SUBSCRIBE");
            self.send(Message::Subscribe {
                request,
                options: Kwargs::new(),
                topic,
            })?;

            let subscription = ack_rx
                .await
                .map_err(|_| TransportError::ConnectionClosed)??;

            let routing = Arc::clone(&self.routing);
            let outgoing = self.outgoing.clone();
            let unsubscribe_request = self.next_request();
            Ok(Subscription::new(events_rx, move || {
                routing.lock().subscriptions.remove(&subscription);
                // Session may already be gone.
                let _ = outgoing.send(Message::Unsubscribe {
                    request: unsubscribe_request,
                    subscription,
                });
            }))
        })
    }

    fn disconnect(&self) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            if self.is_closed() {
                return Ok(());
            }
            self.send(Message::Goodbye {
                details: Kwargs::new(),
                reason: wamp::CLOSE_NORMAL.to_string(),
            })?;
            self.closed
                .send_replace(Some(CloseReason::Graceful(wamp::CLOSE_NORMAL.to_string())));
            Ok(())
        })
    }

    fn closed(&self) -> BoxFuture<'_, CloseReason> {
        let mut closed = self.closed.subscribe();
        Box::pin(async move {
            loop {
                let current = closed.borrow_and_update().clone();
                if let Some(reason) = current {
                    return reason;
                }
                if closed.changed().await.is_err() {
                    return CloseReason::Lost("session dropped".to_string());
                }
            }
        })
    }
}

struct ForgetOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for ForgetOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}

async fn write_frames(
    mut sink: futures_util::stream::SplitSink<WsStream, Frame>,
    mut queue: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(message) = queue.recv().await {
        let is_goodbye = matches!(message, Message::Goodbye { .. });
        let text = match message.to_json() {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "dropping unencodable message");
                continue;
            }
        };
        if let Err(e) = sink.send(Frame::Text(text.into())).await {
            debug!(error = %e, "websocket send failed");
            return;
        }
        if is_goodbye {
            break;
        }
    }
    let _ = sink.close().await;
}

async fn read_frames(
    mut stream: futures_util::stream::SplitStream<WsStream>,
    routing: Arc<Mutex<Routing>>,
    requests: Arc<AtomicI64>,
    outgoing: mpsc::UnboundedSender<Message>,
    closed: watch::Sender<Option<CloseReason>>,
) {
    let reason = loop {
        match stream.next().await {
            Some(Ok(Frame::Text(text))) => match Message::from_json(&text) {
                Ok(Message::Goodbye { reason, .. }) => {
                    let _ = outgoing.send(Message::Goodbye {
                        details: Kwargs::new(),
                        reason: wamp::CLOSE_GOODBYE_AND_OUT.to_string(),
                    });
                    break CloseReason::Graceful(reason);
                }
                Ok(Message::Abort { reason, .. }) => break CloseReason::Lost(reason),
                Ok(message) => {
                    for reply in dispatch(&routing, &requests, message) {
                        let _ = outgoing.send(reply);
                    }
                }
                Err(e) => warn!(error = %e, "ignoring malformed message"),
            },
            Some(Ok(Frame::Close(frame))) => {
                let reason = frame.map(|f| f.reason.as_str().to_string()).unwrap_or_default();
                break CloseReason::Lost(format!("websocket closed {}", reason).trim_end().to_string());
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => break CloseReason::Lost(e.to_string()),
            None => break CloseReason::Lost("websocket ended".to_string()),
        }
    };

    // Dropping the senders fails pending requests and ends subscriptions.
    *routing.lock() = Routing::default();
    closed.send_if_modified(|current| {
        if current.is_none() {
            *current = Some(reason);
            true
        } else {
            false
        }
    });
}

/// Route one router message to its waiter, returning any messages to send
/// back.
fn dispatch(routing: &Mutex<Routing>, requests: &AtomicI64, message: Message) -> Vec<Message> {
    let mut routing = routing.lock();
    match message {
        Message::Result {
            request,
            args,
            kwargs,
            ..
        } => {
            if let Some(tx) = routing.calls.remove(&request) {
                let _ = tx.send(Ok(CallResult { args, kwargs }));
            }
        }
        Message::Subscribed {
            request,
            subscription,
        } => {
            let waiting = match routing.subscribes.remove(&request) {
                Some((ack, events)) => {
                    let waiting = ack.send(Ok(subscription)).is_ok();
                    if waiting {
                        routing.subscriptions.insert(subscription, events);
                        routing.abandoned.remove(&subscription);
                    }
                    waiting
                }
                None => false,
            };
            if !waiting && !routing.subscriptions.contains_key(&subscription) {
                routing.abandoned.insert(subscription);
            }
            return routing.release_abandoned(requests);
        }
        Message::Event {
            subscription,
            args,
            kwargs,
            ..
        } => {
            if let Some(tx) = routing.subscriptions.get(&subscription) {
                let _ = tx.send(Publication { args, kwargs });
            }
        }
        Message::Error {
            request_type,
            request,
            error,
            args,
            ..
        } => {
            let message = args
                .first()
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let failure = TransportError::Remote { error, message };
            match request_type {
                wamp::CALL => {
                    if let Some(tx) = routing.calls.remove(&request) {
                        let _ = tx.send(Err(failure));
                    }
                }
                wamp::SUBSCRIBE => {
                    if let Some((ack, _)) = routing.subscribes.remove(&request) {
                        let _ = ack.send(Err(failure));
                    }
                    return routing.release_abandoned(requests);
                }
                _ => debug!(request_type, request, "unhandled ERROR"),
            }
        }
        Message::Unsubscribed { .. } => {}
        other => debug!(message = ?other, "unexpected message"),
    }
    Vec::new()
}

#[cfg(test)]
#[path = "websocket_tests.rs"]
mod tests;
