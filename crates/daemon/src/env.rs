// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::net::SocketAddr;
use std::time::Duration;

fn duration_var(name: &str, default: Duration, unit_ms: u64) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(|v| Duration::from_millis(v * unit_ms))
        .unwrap_or(default)
}

/// Expected heartbeat cadence in seconds (`HEARTBEAT_INTERVAL`, default 10).
/// Liveness and staleness cutoffs both derive from this value.
pub fn heartbeat_interval() -> Duration {
    duration_var("HEARTBEAT_INTERVAL", Duration::from_secs(10), 1_000)
}

/// HTTP listen address (`FLEET_LISTEN_ADDR`, default `0.0.0.0:8080`).
pub fn listen_addr() -> SocketAddr {
    std::env::var("FLEET_LISTEN_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
}

/// Deadline for one dispatch call (`FLEET_DISPATCH_TIMEOUT_MS`, default 10s).
pub fn dispatch_timeout() -> Duration {
    duration_var("FLEET_DISPATCH_TIMEOUT_MS", Duration::from_secs(10), 1)
}

/// Period of the scheduler/dispatcher/janitor loops
/// (`FLEET_TICK_MS`, default one minute).
pub fn tick_interval() -> Duration {
    duration_var("FLEET_TICK_MS", Duration::from_secs(60), 1)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
