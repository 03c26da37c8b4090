// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network path checks used to classify connection timeouts.

use futures_util::future::BoxFuture;
use tokio_tungstenite::tungstenite::http::Uri;
use tracing::debug;

use crate::connection::Endpoint;

/// Reports whether the router can be reached at all.
pub trait Reachability: Send + Sync {
    fn is_reachable<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, bool>;
}

/// Treats the router as reachable when its host name resolves.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolveReachability;

impl Reachability for ResolveReachability {
    fn is_reachable<'a>(&'a self, endpoint: &'a Endpoint) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let Some(authority) = host_and_port(&endpoint.url) else {
                return false;
            };
            let resolved = match tokio::net::lookup_host(authority.as_str()).await {
                Ok(mut addrs) => addrs.next().is_some(),
                Err(e) => {
                    debug!(url = %endpoint.url, error = %e, "router host did not resolve");
                    false
                }
            };
            resolved
        })
    }
}

/// Always reachable; for environments without name resolution.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeReachable;

impl Reachability for AssumeReachable {
    fn is_reachable<'a>(&'a self, _endpoint: &'a Endpoint) -> BoxFuture<'a, bool> {
        Box::pin(async { true })
    }
}

/// `host:port` of a WebSocket URL, defaulting the port from the scheme.
pub fn host_and_port(url: &str) -> Option<String> {
    let uri: Uri = url.parse().ok()?;
    let host = uri.host()?;
    let port = match (uri.port_u16(), uri.scheme_str()) {
        (Some(port), _) => port,
        (None, Some("wss")) => 443,
        (None, Some("ws")) => 80,
        _ => return None,
    };
    Some(format!("{}:{}", host, port))
}

#[cfg(test)]
#[path = "reachability_tests.rs"]
mod tests;
