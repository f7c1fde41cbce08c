// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Demotes silent agents and fails runs that never finished.

use crate::bus::EventBus;
use crate::registry::{AgentRegistry, RegistryResult, RunRegistry};
use fleet_core::{BusEvent, Clock};
use fleet_storage::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs stuck in starting/running longer than this are failed.
const STUCK_RUN_CUTOFF_SECS: i64 = 3600;

/// Heartbeat-interval multiple after which an agent's stored status is
/// demoted to offline. Availability already cuts off at two intervals; this
/// only updates the record, it never widens that check.
const STALE_MULTIPLIER: u32 = 5;

#[derive(Clone)]
pub struct Janitor<C: Clock> {
    store: Arc<dyn Store>,
    runs: RunRegistry<C>,
    agents: AgentRegistry<C>,
    bus: EventBus,
    clock: C,
    heartbeat_interval: Duration,
}

impl<C: Clock> Janitor<C> {
    pub fn new(
        store: Arc<dyn Store>,
        runs: RunRegistry<C>,
        agents: AgentRegistry<C>,
        bus: EventBus,
        clock: C,
        heartbeat_interval: Duration,
    ) -> Self {
        Self { store, runs, agents, bus, clock, heartbeat_interval }
    }

    /// Both sweeps are idempotent: a second pass over unchanged state finds
    /// nothing to do.
    pub async fn tick(&self) -> RegistryResult<()> {
        self.sweep_agents().await?;
        self.sweep_stuck_runs().await
    }

    async fn sweep_agents(&self) -> RegistryResult<()> {
        let stale_after = self.heartbeat_interval * STALE_MULTIPLIER;
        let cutoff = self.clock.now()
            - chrono::Duration::milliseconds(stale_after.as_millis() as i64);
        for agent in self.store.sweep_stale_agents(cutoff).await? {
            info!(agent = %agent.agent_id, "agent went offline");
            self.bus.publish(BusEvent::AgentUpdated { agent });
        }
        Ok(())
    }

    async fn sweep_stuck_runs(&self) -> RegistryResult<()> {
        let cutoff = self.clock.now() - chrono::Duration::seconds(STUCK_RUN_CUTOFF_SECS);
        for run in self.store.list_stuck(cutoff).await? {
            warn!(run = %run.id, status = %run.status, "failing stuck run");
            if let Err(e) = self.runs.fail(&run.id, "run exceeded maximum duration").await {
                warn!(run = %run.id, error = %e, "stuck-run cleanup failed");
                continue;
            }
            if let Some(agent_id) = run.agent_id.as_ref() {
                self.agents.release(agent_id).await?;
            }
        }
        Ok(())
    }

    /// Drive ticks until shutdown.
    pub async fn run(self, period: Duration, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        warn!(error = %e, "janitor tick failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "janitor_tests.rs"]
mod tests;
