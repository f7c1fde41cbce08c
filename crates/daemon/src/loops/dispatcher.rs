// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Promotes due runs and drains the queue onto available agents.

use crate::registry::{AgentRegistry, RegistryResult, RunRegistry};
use crate::transport::Transport;
use fleet_core::{AgentId, Clock, Run};
use fleet_storage::Store;
use fleet_wire::StartRunRequest;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Moves work onto agents in two phases: due `scheduled` runs become
/// `queued`, then the queue drains FIFO onto claimed agents.
#[derive(Clone)]
pub struct Dispatcher<C: Clock> {
    store: Arc<dyn Store>,
    runs: RunRegistry<C>,
    agents: AgentRegistry<C>,
    transport: Arc<dyn Transport>,
    clock: C,
    /// Serializes queue drains; with agent acquisition being a CAS this is
    /// what keeps one agent from holding two live runs.
    drain: Arc<Mutex<()>>,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(
        store: Arc<dyn Store>,
        runs: RunRegistry<C>,
        agents: AgentRegistry<C>,
        transport: Arc<dyn Transport>,
        clock: C,
    ) -> Self {
        Self { store, runs, agents, transport, clock, drain: Arc::new(Mutex::new(())) }
    }

    pub async fn tick(&self) -> RegistryResult<()> {
        self.promote_due().await?;
        self.drain_queue().await
    }

    /// Phase A: scheduled runs whose start time has arrived become queued.
    async fn promote_due(&self) -> RegistryResult<()> {
        let now = self.clock.now();
        for run in self.store.list_due_scheduled(now).await? {
            if let Err(e) = self.runs.promote(&run.id).await {
                warn!(run = %run.id, error = %e, "promotion failed");
            }
        }
        Ok(())
    }

    /// Phase B: hand queued runs to agents, oldest scheduled time first.
    /// Stops when the agent pool is dry; the queue waits for the next pass.
    async fn drain_queue(&self) -> RegistryResult<()> {
        let _serialized = self.drain.lock().await;
        let mut refused: HashSet<AgentId> = HashSet::new();
        for run in self.store.list_queued().await? {
            let bot = match self.store.get_bot(&run.bot_id).await? {
                Some(bot) => bot,
                None => {
                    self.runs.fail(&run.id, "bot definition no longer exists").await?;
                    continue;
                }
            };
            let Some(agent) = self.agents.acquire_one_excluding(&refused).await? else {
                break;
            };
            let run = match self.runs.assign(&run.id, agent.agent_id.clone()).await {
                Ok(run) => run,
                Err(e) => {
                    // Raced with a cancel; put the agent back and move on.
                    warn!(run = %run.id, error = %e, "assignment failed");
                    self.agents.release(&agent.agent_id).await?;
                    continue;
                }
            };
            let request = StartRunRequest {
                bot_id: bot.id.clone(),
                script: bot.script.clone(),
                run_id: run.id.clone(),
            };
            match self.transport.start_run(&agent.public_url, &request).await {
                Ok(()) => {
                    info!(run = %run.id, agent = %agent.agent_id, "dispatched");
                }
                Err(e) => {
                    warn!(run = %run.id, agent = %agent.agent_id, error = %e, "dispatch failed");
                    self.fail_dispatch(&run, &e.to_string()).await?;
                    self.agents.release(&agent.agent_id).await?;
                    refused.insert(agent.agent_id);
                }
            }
        }
        Ok(())
    }

    async fn fail_dispatch(&self, run: &Run, error: &str) -> RegistryResult<()> {
        self.runs.fail(&run.id, &format!("dispatch failed: {error}")).await?;
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
                        warn!(error = %e, "dispatcher tick failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
