// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fleet-daemon: the orchestrator control plane.
//!
//! Registries mutate the store and publish to the bus; periodic loops move
//! scheduled work onto agents; the HTTP surface and the socket streams are
//! thin edges over the same registries.

pub mod app;
pub mod bus;
pub mod env;
pub mod http;
pub mod loops;
pub mod registry;
pub mod router;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use app::{App, Config};
pub use bus::{BusSubscriber, EventBus};
pub use registry::{AgentRegistry, BotRegistry, RegistryError, RunRegistry};
pub use router::InboundRouter;
pub use transport::{HttpTransport, Transport, TransportError};
