// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ClientConfig::load(&dir.path().join("config.toml")).unwrap();
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn defaults_match_documented_values() {
    let config = ClientConfig::default();
    assert_eq!(config.agency.time_resolution_secs, 30);
    assert_eq!(config.agency.search_radius_m, 500);

    let connection = config.connection_config();
    assert_eq!(connection.request_timeout, Duration::from_secs(10));
    assert_eq!(connection.request_retry.delay, Duration::from_millis(500));
    assert_eq!(connection.request_retry.max_attempts, None);
    assert_eq!(connection.reconnect.max_attempts, None);
    assert_eq!(connection.cache_capacity, 100);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[server]
url = "wss://transit.example.org/ws"

[connection]
max_reconnect_attempts = 5
"#,
    )
    .unwrap();

    let config = ClientConfig::load(&path).unwrap();
    assert_eq!(config.server.url, "wss://transit.example.org/ws");
    assert_eq!(config.server.realm, "realm1");
    assert_eq!(config.connection.max_reconnect_attempts, Some(5));
    assert_eq!(config.connection.reconnect_delay_ms, 1_000);
    assert_eq!(
        config.connection_config().reconnect,
        RetryPolicy::bounded(Duration::from_secs(1), 5)
    );
}

#[test]
fn round_trips_through_toml() {
    let mut config = ClientConfig::default();
    config.server.schedule_service = "timetable".to_string();
    config.connection.max_request_attempts = Some(3);

    let text = config.to_toml().unwrap();
    assert_eq!(ClientConfig::parse(&text).unwrap(), config);
}

#[test]
fn malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[server\nurl = 1").unwrap();

    let err = ClientConfig::load(&path).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[parameterized(
    http_url = { "[server]\nurl = \"http://example.org\"" },
    empty_realm = { "[server]\nrealm = \"\"" },
    zero_timeout = { "[connection]\nrequest_timeout_ms = 0" },
)]
fn invalid_settings_are_rejected(content: &str) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();

    assert!(matches!(ClientConfig::load(&path), Err(Error::Config(_))));
}

#[test]
fn endpoint_carries_server_settings() {
    let config = ClientConfig::default();
    let endpoint = config.endpoint();
    assert_eq!(endpoint.url, config.server.url);
    assert_eq!(endpoint.realm, "realm1");
    assert_eq!(endpoint.schedule_service, "schedule");
}

#[test]
fn default_path_is_under_wayline() {
    if let Some(path) = default_path() {
        assert!(path.ends_with("wayline/config.toml"));
    }
}
