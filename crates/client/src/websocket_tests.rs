// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use futures_util::FutureExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use wl_core::Value;

use crate::testing::header;

/// Accepts WebSocket clients and answers them like a minimal router.
async fn spawn_router() -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream));
        }
    });
    Endpoint {
        url: format!("ws://{}/ws", addr),
        realm: "realm1".to_string(),
        schedule_service: "schedule".to_string(),
    }
}

async fn serve(stream: TcpStream) {
    let negotiate = |_request: &Request, mut response: Response| -> Result<Response, ErrorResponse> {
        response.headers_mut().insert(
            "Sec-WebSocket-Protocol",
            HeaderValue::from_static(wamp::SUBPROTOCOL),
        );
        Ok(response)
    };
    let mut ws = tokio_tungstenite::accept_hdr_async(stream, negotiate)
        .await
        .unwrap();

    while let Some(Ok(frame)) = ws.next().await {
        let Frame::Text(text) = frame else { continue };
        let replies = match Message::from_json(&text).unwrap() {
            Message::Hello { .. } => vec![Message::Welcome {
                session: 42,
                details: Kwargs::new(),
            }],
            Message::Call { procedure, .. } if procedure == "router.drop" => return,
            Message::Call { procedure, .. } if procedure == "router.shutdown" => {
                vec![Message::Goodbye {
                    details: Kwargs::new(),
                    reason: "wamp.close.system_shutdown".to_string(),
                }]
            }
            Message::Call {
                request,
                procedure,
                args,
                kwargs,
                ..
            } if procedure == "router.echo" => vec![Message::Result {
                request,
                details: Kwargs::new(),
                args,
                kwargs,
            }],
            Message::Call { request, .. } => vec![Message::Error {
                request_type: wamp::CALL,
                request,
                details: Kwargs::new(),
                error: "wamp.error.no_such_procedure".to_string(),
                args: vec![Value::from("no callee registered")],
                kwargs: Kwargs::new(),
            }],
            Message::Subscribe { request, .. } => vec![
                Message::Subscribed {
                    request,
                    subscription: 7,
                },
                Message::Event {
                    subscription: 7,
                    publication: 1,
                    details: Kwargs::new(),
                    args: vec![Value::from("BUS7")],
                    kwargs: header("update", "schedule"),
                },
            ],
            Message::Unsubscribe { request, .. } => vec![Message::Unsubscribed { request }],
            Message::Goodbye { .. } => return,
            _ => Vec::new(),
        };
        for reply in replies {
            ws.send(Frame::Text(reply.to_json().unwrap().into()))
                .await
                .unwrap();
        }
    }
}

#[tokio::test]
async fn call_returns_result_payload() {
    let endpoint = spawn_router().await;
    let session = WebSocketTransport::new().connect(&endpoint).await.unwrap();

    let mut kwargs = Kwargs::new();
    kwargs.insert("limit".into(), Value::Int(2));
    let result = session
        .call("router.echo", vec![Value::from("A")], kwargs.clone())
        .await
        .unwrap();

    assert_eq!(result.args, vec![Value::from("A")]);
    assert_eq!(result.kwargs, kwargs);
}

#[tokio::test]
async fn call_error_is_remote() {
    let endpoint = spawn_router().await;
    let session = WebSocketTransport::new().connect(&endpoint).await.unwrap();

    let err = session
        .call("agency.missing", Args::new(), Kwargs::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransportError::Remote {
            error: "wamp.error.no_such_procedure".to_string(),
            message: "no callee registered".to_string(),
        }
    );
}

#[tokio::test]
async fn subscription_receives_events() {
    let endpoint = spawn_router().await;
    let session = WebSocketTransport::new().connect(&endpoint).await.unwrap();

    let mut subscription = session.subscribe("vehicles.BUS7").await.unwrap();
    let publication = subscription.next().await.unwrap();

    assert_eq!(publication.args, vec![Value::from("BUS7")]);
    assert_eq!(publication.kwargs, header("update", "schedule"));
}

#[tokio::test]
async fn router_goodbye_is_graceful() {
    let endpoint = spawn_router().await;
    let session = WebSocketTransport::new().connect(&endpoint).await.unwrap();

    let pending = session.call("router.shutdown", Args::new(), Kwargs::new());
    assert_eq!(pending.await, Err(TransportError::ConnectionClosed));
    assert_eq!(
        session.closed().await,
        CloseReason::Graceful("wamp.close.system_shutdown".to_string())
    );
}

#[tokio::test]
async fn dropped_socket_is_lost_and_fails_pending_calls() {
    let endpoint = spawn_router().await;
    let session = WebSocketTransport::new().connect(&endpoint).await.unwrap();

    let err = session
        .call("router.drop", Args::new(), Kwargs::new())
        .await
        .unwrap_err();

    assert_eq!(err, TransportError::ConnectionClosed);
    assert!(matches!(session.closed().await, CloseReason::Lost(_)));
}

#[tokio::test]
async fn disconnect_closes_gracefully() {
    let endpoint = spawn_router().await;
    let session = WebSocketTransport::new().connect(&endpoint).await.unwrap();

    session.disconnect().await.unwrap();

    assert!(matches!(session.closed().await, CloseReason::Graceful(_)));
    assert_eq!(
        session.call("router.echo", Args::new(), Kwargs::new()).await,
        Err(TransportError::ConnectionClosed)
    );
}

#[tokio::test]
async fn refused_connection_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let endpoint = Endpoint {
        url: format!("ws://{}/ws", addr),
        realm: "realm1".to_string(),
        schedule_service: "schedule".to_string(),
    };

    let result = WebSocketTransport::new().connect(&endpoint).await;
    assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
}

#[test]
fn abandoned_subscribe_is_unsubscribed_when_acknowledged() {
    let (outgoing, mut queue) = mpsc::unbounded_channel();
    let session = WampSession::new(outgoing);

    // Give up before SUBSCRIBED arrives, as a cancelled stream does.
    assert!(session.subscribe("routes.1").now_or_never().is_none());
    assert!(session.routing.lock().subscribes.is_empty());
    let Ok(Message::Subscribe { request, .. }) = queue.try_recv() else {
        panic!("SUBSCRIBE was not sent");
    };

    let replies = dispatch(
        &session.routing,
        &session.requests,
        Message::Subscribed {
            request,
            subscription: 7,
        },
    );

    assert!(matches!(
        replies.as_slice(),
        [Message::Unsubscribe { subscription: 7, .. }]
    ));
    assert!(session.routing.lock().subscriptions.is_empty());
}

#[test]
fn abandoned_subscription_waits_for_pending_subscribes() {
    let (outgoing, mut queue) = mpsc::unbounded_channel();
    let session = WampSession::new(outgoing);
    assert!(session.subscribe("routes.1").now_or_never().is_none());
    let mut retry = session.subscribe("routes.1");
    assert!((&mut retry).now_or_never().is_none());
    let mut requests = Vec::new();
    while let Ok(Message::Subscribe { request, .. }) = queue.try_recv() {
        requests.push(request);
    }
    let &[abandoned, pending] = requests.as_slice() else {
        panic!("expected two SUBSCRIBEs, got {:?}", requests);
    };

    // The router may answer both with the same id; keep it for the retry.
    let early = dispatch(
        &session.routing,
        &session.requests,
        Message::Subscribed {
            request: abandoned,
            subscription: 7,
        },
    );
    let late = dispatch(
        &session.routing,
        &session.requests,
        Message::Subscribed {
            request: pending,
            subscription: 7,
        },
    );

    assert!(early.is_empty());
    assert!(late.is_empty());
    assert!(matches!(retry.now_or_never(), Some(Ok(_))));
}

#[test]
fn acknowledged_subscribe_routes_events() {
    let (outgoing, mut queue) = mpsc::unbounded_channel();
    let session = WampSession::new(outgoing);
    let mut subscribe = session.subscribe("routes.1");
    assert!((&mut subscribe).now_or_never().is_none());
    let Ok(Message::Subscribe { request, .. }) = queue.try_recv() else {
        panic!("SUBSCRIBE was not sent");
    };

    let replies = dispatch(
        &session.routing,
        &session.requests,
        Message::Subscribed {
            request,
            subscription: 7,
        },
    );

    assert!(replies.is_empty());
    let Some(Ok(_subscription)) = subscribe.now_or_never() else {
        panic!("subscribe did not resolve");
    };
    assert!(session.routing.lock().subscriptions.contains_key(&7));
}
