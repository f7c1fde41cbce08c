// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent fleet registry: identity, liveness, availability.

use super::{RegistryError, RegistryResult};
use crate::bus::EventBus;
use fleet_core::{Agent, AgentId, AgentStatus, BusEvent, Clock};
use fleet_storage::Store;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Tracks worker agents and computes the dispatchable set.
#[derive(Clone)]
pub struct AgentRegistry<C: Clock> {
    store: Arc<dyn Store>,
    bus: EventBus,
    clock: C,
    heartbeat_interval: Duration,
}

impl<C: Clock> AgentRegistry<C> {
    pub fn new(
        store: Arc<dyn Store>,
        bus: EventBus,
        clock: C,
        heartbeat_interval: Duration,
    ) -> Self {
        Self { store, bus, clock, heartbeat_interval }
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    /// Upsert by `agent_id`, stamping the heartbeat.
    pub async fn register(
        &self,
        agent_id: AgentId,
        status: AgentStatus,
        resources: Map<String, Value>,
        public_url: String,
    ) -> RegistryResult<Agent> {
        let agent = Agent {
            agent_id,
            status,
            resources,
            public_url,
            last_heartbeat: self.clock.now(),
        };
        let agent = self.store.upsert_agent(agent).await?;
        self.bus.publish(BusEvent::AgentUpdated { agent: agent.clone() });
        Ok(agent)
    }

    /// Record a heartbeat. An offline agent proves it is back and becomes
    /// available again; any other status is preserved.
    pub async fn heartbeat(&self, agent_id: &AgentId) -> RegistryResult<Agent> {
        let agent = self
            .store
            .record_heartbeat(agent_id, self.clock.now())
            .await?
            .ok_or_else(|| RegistryError::not_found("agent", agent_id.as_str()))?;
        let agent = if agent.status == AgentStatus::Offline {
            self.store
                .set_agent_status(agent_id, AgentStatus::Available)
                .await?
                .ok_or_else(|| RegistryError::not_found("agent", agent_id.as_str()))?
        } else {
            agent
        };
        self.bus.publish(BusEvent::AgentUpdated { agent: agent.clone() });
        Ok(agent)
    }

    /// Unconditional status assignment.
    pub async fn set_status(
        &self,
        agent_id: &AgentId,
        status: AgentStatus,
    ) -> RegistryResult<Agent> {
        let agent = self
            .store
            .set_agent_status(agent_id, status)
            .await?
            .ok_or_else(|| RegistryError::not_found("agent", agent_id.as_str()))?;
        self.bus.publish(BusEvent::AgentUpdated { agent: agent.clone() });
        Ok(agent)
    }

    pub async fn get(&self, agent_id: &AgentId) -> RegistryResult<Agent> {
        self.store
            .get_agent(agent_id)
            .await?
            .ok_or_else(|| RegistryError::not_found("agent", agent_id.as_str()))
    }

    pub async fn list(&self) -> RegistryResult<Vec<Agent>> {
        Ok(self.store.list_agents().await?)
    }

    /// Agents that are available and recently heartbeating.
    pub async fn list_available(&self) -> RegistryResult<Vec<Agent>> {
        let now = self.clock.now();
        Ok(self
            .store
            .list_agents()
            .await?
            .into_iter()
            .filter(|a| {
                a.status == AgentStatus::Available && a.is_live(now, self.heartbeat_interval)
            })
            .collect())
    }

    /// Atomically claim one available agent, flipping it to busy.
    ///
    /// The store's compare-and-swap decides races: two concurrent callers
    /// never win the same agent.
    pub async fn acquire_one(&self) -> RegistryResult<Option<Agent>> {
        self.acquire_one_excluding(&HashSet::new()).await
    }

    /// Claim like [`acquire_one`](Self::acquire_one), skipping the given
    /// agents. Dispatch uses this so an agent that just refused a run does
    /// not immediately take the next one in the same pass.
    pub async fn acquire_one_excluding(
        &self,
        exclude: &HashSet<AgentId>,
    ) -> RegistryResult<Option<Agent>> {
        for candidate in self.list_available().await? {
            if exclude.contains(&candidate.agent_id) {
                continue;
            }
            let claimed = self
                .store
                .cas_agent_status(&candidate.agent_id, AgentStatus::Available, AgentStatus::Busy)
                .await?;
            if let Some(agent) = claimed {
                self.bus.publish(BusEvent::AgentUpdated { agent: agent.clone() });
                return Ok(Some(agent));
            }
        }
        Ok(None)
    }

    /// Return a claimed agent to the pool. No-op unless currently busy, so
    /// replayed completions and double releases are harmless.
    pub async fn release(&self, agent_id: &AgentId) -> RegistryResult<()> {
        let released = self
            .store
            .cas_agent_status(agent_id, AgentStatus::Busy, AgentStatus::Available)
            .await?;
        if let Some(agent) = released {
            self.bus.publish(BusEvent::AgentUpdated { agent });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
