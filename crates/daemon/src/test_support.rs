// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for daemon and workspace tests.

use crate::app::{App, Config};
use crate::loops::{Dispatcher, Janitor, Scheduler};
use crate::transport::RecordingTransport;
use fleet_core::FakeClock;
use fleet_storage::MemoryStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Everything a test needs to drive the control plane deterministically:
/// frozen clock, in-memory store, recording transport, and the three loops
/// wired to the same registries the HTTP surface uses.
pub struct Harness {
    pub app: App<FakeClock>,
    pub clock: FakeClock,
    pub transport: Arc<RecordingTransport>,
    pub scheduler: Scheduler<FakeClock>,
    pub dispatcher: Dispatcher<FakeClock>,
    pub janitor: Janitor<FakeClock>,
}

pub fn harness() -> Harness {
    harness_with_heartbeat(Duration::from_secs(10))
}

pub fn harness_with_heartbeat(heartbeat_interval: Duration) -> Harness {
    let clock = FakeClock::new();
    let config = Config {
        heartbeat_interval,
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        dispatch_timeout: Duration::from_secs(10),
        tick_interval: Duration::from_secs(60),
    };
    let app = App::new(Arc::new(MemoryStore::new()), clock.clone(), config);
    let transport = Arc::new(RecordingTransport::new());
    let scheduler = app.scheduler();
    let dispatcher = app.dispatcher(transport.clone());
    let janitor = app.janitor();
    Harness { app, clock, transport, scheduler, dispatcher, janitor }
}
