// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is read from `wayline/config.toml` in the platform config
//! directory and has three tables:
//! - `[server]`: router URL, realm, and the schedule service name
//! - `[agency]`: schedule time resolution and station search radius
//! - `[connection]`: timeouts, retry delays, and cache size
//!
//! Every key is optional; a missing file yields the defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CAPACITY;
use crate::connection::{ConnectionConfig, Endpoint};
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

const CONFIG_DIR_NAME: &str = "wayline";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agency: AgencyConfig,
    #[serde(default)]
    pub connection: ConnectionSettings,
}

/// Where the router lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// WebSocket URL (`ws://` or `wss://`).
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_realm")]
    pub realm: String,
    /// Service whose procedures answer schedule lookups.
    #[serde(default = "default_schedule_service")]
    pub schedule_service: String,
}

/// Agency-wide query settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyConfig {
    /// Schedule timestamps are rounded to this many seconds.
    #[serde(default = "default_time_resolution_secs")]
    pub time_resolution_secs: u64,
    /// Radius for nearby-station searches, in meters.
    #[serde(default = "default_search_radius_m")]
    pub search_radius_m: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_request_retry_delay_ms")]
    pub request_retry_delay_ms: u64,
    /// Give up on a request after this many timeouts. Absent = never.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_request_attempts: Option<u32>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Give up reconnecting after this many failed attempts. Absent = never.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reconnect_attempts: Option<u32>,
    /// Topics kept in the response cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_url() -> String {
    "ws://localhost:8080/ws".to_string()
}

fn default_realm() -> String {
    "realm1".to_string()
}

fn default_schedule_service() -> String {
    "schedule".to_string()
}

fn default_time_resolution_secs() -> u64 {
    30
}

fn default_search_radius_m() -> u32 {
    500
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_request_retry_delay_ms() -> u64 {
    500
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_reconnect_delay_ms() -> u64 {
    1_000
}

fn default_cache_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            url: default_url(),
            realm: default_realm(),
            schedule_service: default_schedule_service(),
        }
    }
}

impl Default for AgencyConfig {
    fn default() -> Self {
        AgencyConfig {
            time_resolution_secs: default_time_resolution_secs(),
            search_radius_m: default_search_radius_m(),
        }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        ConnectionSettings {
            request_timeout_ms: default_request_timeout_ms(),
            request_retry_delay_ms: default_request_retry_delay_ms(),
            max_request_attempts: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_attempts: None,
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from `path`, falling back to defaults if the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(Error::Config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        let url = &self.server.url;
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(Error::Config(format!(
                "invalid server url '{}': must be ws:// or wss://",
                url
            )));
        }
        if self.server.realm.is_empty() {
            return Err(Error::Config("server realm must not be empty".to_string()));
        }
        if self.connection.request_timeout_ms == 0 || self.connection.connect_timeout_ms == 0 {
            return Err(Error::Config("timeouts must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            url: self.server.url.clone(),
            realm: self.server.realm.clone(),
            schedule_service: self.server.schedule_service.clone(),
        }
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        let c = &self.connection;
        ConnectionConfig {
            request_timeout: Duration::from_millis(c.request_timeout_ms),
            request_retry: RetryPolicy {
                delay: Duration::from_millis(c.request_retry_delay_ms),
                max_attempts: c.max_request_attempts,
            },
            connect_timeout: Duration::from_millis(c.connect_timeout_ms),
            reconnect: RetryPolicy {
                delay: Duration::from_millis(c.reconnect_delay_ms),
                max_attempts: c.max_reconnect_attempts,
            },
            cache_capacity: c.cache_capacity,
        }
    }
}

/// Default location of the configuration file, if the platform has a
/// config directory.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
