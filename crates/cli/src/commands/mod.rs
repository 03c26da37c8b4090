// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod canonical;
pub mod config;
pub mod decode;
pub mod list;
pub mod near;
pub mod visits;
pub mod watch;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use wl_client::config::default_path;
use wl_client::{Client, ClientConfig, ConnectionPool, StatusMessage, StatusSink, WebSocketTransport};

use crate::error::Result;

/// Load the configuration from `path`, or from the default location.
///
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    match path.map(Path::to_path_buf).or_else(default_path) {
        Some(path) => Ok(ClientConfig::load(&path)?),
        None => Ok(ClientConfig::default()),
    }
}

/// Connection status lines on stderr.
pub struct StderrStatus;

impl StatusSink for StderrStatus {
    fn publish(&self, status: Option<StatusMessage>) {
        if let Some(status) = status {
            eprintln!("{}", status);
        }
    }
}

/// Run `f` with a client connected to the configured server.
pub fn with_client<T, F, Fut>(config: &ClientConfig, f: F) -> Result<T>
where
    F: FnOnce(Client) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let pool = ConnectionPool::new(Arc::new(WebSocketTransport))
            .with_config(config.connection_config())
            .with_status(Arc::new(StderrStatus));
        let result = f(Client::connect(&pool, config)).await;
        pool.shutdown();
        result
    })
}
