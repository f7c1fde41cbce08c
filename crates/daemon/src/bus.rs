// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event fan-out to observer streams.
//!
//! Publishing never blocks. A subscriber that falls behind loses its oldest
//! undelivered events; the loss is counted and surfaced through `/health`.

use fleet_core::BusEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// Per-subscriber buffer before overflow starts dropping.
const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BusEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, dropped: Arc::new(AtomicU64::new(0)) }
    }

    /// Publish to all current subscribers. A daemon with no observers still
    /// publishes; the send result is irrelevant.
    pub fn publish(&self, event: BusEvent) {
        trace!("{}", event.log_summary());
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> BusSubscriber {
        BusSubscriber { rx: self.tx.subscribe(), dropped: Arc::clone(&self.dropped) }
    }

    /// Total events dropped across all subscribers since startup.
    pub fn dropped_total(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of the bus.
pub struct BusSubscriber {
    rx: broadcast::Receiver<BusEvent>,
    dropped: Arc<AtomicU64>,
}

impl BusSubscriber {
    /// Next event. Skips over anything this subscriber was too slow to take,
    /// counting the loss. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<BusEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    self.dropped.fetch_add(n, Ordering::Relaxed);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant for draining in tests.
    pub fn try_recv(&mut self) -> Option<BusEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    self.dropped.fetch_add(n, Ordering::Relaxed);
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
