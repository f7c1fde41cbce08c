// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory reference engine: indexed tables behind a single lock.

use crate::{Store, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleet_core::{Agent, AgentId, AgentStatus, Bot, BotId, Run, RunEvent, RunId, RunLog, RunStatus};
use indexmap::IndexMap;
use parking_lot::RwLock;

#[derive(Default)]
struct Tables {
    bots: IndexMap<BotId, Bot>,
    agents: IndexMap<AgentId, Agent>,
    runs: IndexMap<RunId, Run>,
    run_events: Vec<RunEvent>,
    run_logs: Vec<RunLog>,
}

/// The in-tree [`Store`] engine. Insertion-ordered tables give deterministic
/// listings; every mutation happens under one write lock, which is what makes
/// `cas_agent_status` a true compare-and-swap.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_bot(&self, bot: Bot) -> StoreResult<()> {
        self.tables.write().bots.insert(bot.id.clone(), bot);
        Ok(())
    }

    async fn get_bot(&self, id: &BotId) -> StoreResult<Option<Bot>> {
        Ok(self.tables.read().bots.get(id).cloned())
    }

    async fn update_bot(&self, bot: Bot) -> StoreResult<()> {
        let mut tables = self.tables.write();
        match tables.bots.get_mut(&bot.id) {
            Some(slot) => {
                *slot = bot;
                Ok(())
            }
            None => Err(StoreError::not_found("bot", bot.id.as_str())),
        }
    }

    async fn delete_bot(&self, id: &BotId) -> StoreResult<bool> {
        Ok(self.tables.write().bots.shift_remove(id).is_some())
    }

    async fn list_bots(&self) -> StoreResult<Vec<Bot>> {
        Ok(self.tables.read().bots.values().cloned().collect())
    }

    async fn list_scheduled_bots(&self) -> StoreResult<Vec<Bot>> {
        Ok(self
            .tables
            .read()
            .bots
            .values()
            .filter(|b| b.schedule.is_some())
            .cloned()
            .collect())
    }

    async fn upsert_agent(&self, agent: Agent) -> StoreResult<Agent> {
        let mut tables = self.tables.write();
        tables.agents.insert(agent.agent_id.clone(), agent.clone());
        Ok(agent)
    }

    async fn get_agent(&self, id: &AgentId) -> StoreResult<Option<Agent>> {
        Ok(self.tables.read().agents.get(id).cloned())
    }

    async fn list_agents(&self) -> StoreResult<Vec<Agent>> {
        Ok(self.tables.read().agents.values().cloned().collect())
    }

    async fn record_heartbeat(
        &self,
        id: &AgentId,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Agent>> {
        let mut tables = self.tables.write();
        Ok(tables.agents.get_mut(id).map(|agent| {
            // Out-of-order delivery never moves the heartbeat backwards.
            agent.last_heartbeat = agent.last_heartbeat.max(at);
            agent.clone()
        }))
    }

    async fn set_agent_status(
        &self,
        id: &AgentId,
        status: AgentStatus,
    ) -> StoreResult<Option<Agent>> {
        let mut tables = self.tables.write();
        Ok(tables.agents.get_mut(id).map(|agent| {
            agent.status = status;
            agent.clone()
        }))
    }

    async fn cas_agent_status(
        &self,
        id: &AgentId,
        expected: AgentStatus,
        next: AgentStatus,
    ) -> StoreResult<Option<Agent>> {
        let mut tables = self.tables.write();
        Ok(tables.agents.get_mut(id).and_then(|agent| {
            if agent.status != expected {
                return None;
            }
            agent.status = next;
            Some(agent.clone())
        }))
    }

    async fn sweep_stale_agents(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Agent>> {
        let mut tables = self.tables.write();
        let mut changed = Vec::new();
        for agent in tables.agents.values_mut() {
            if agent.status != AgentStatus::Offline && agent.last_heartbeat < cutoff {
                agent.status = AgentStatus::Offline;
                changed.push(agent.clone());
            }
        }
        Ok(changed)
    }

    async fn insert_run(&self, run: Run) -> StoreResult<()> {
        self.tables.write().runs.insert(run.id.clone(), run);
        Ok(())
    }

    async fn get_run(&self, id: &RunId) -> StoreResult<Option<Run>> {
        Ok(self.tables.read().runs.get(id).cloned())
    }

    async fn update_run(&self, run: Run) -> StoreResult<()> {
        let mut tables = self.tables.write();
        match tables.runs.get_mut(&run.id) {
            Some(slot) => {
                *slot = run;
                Ok(())
            }
            None => Err(StoreError::not_found("run", run.id.as_str())),
        }
    }

    async fn list_runs(&self) -> StoreResult<Vec<Run>> {
        Ok(self.tables.read().runs.values().cloned().collect())
    }

    async fn list_runs_by_bot(&self, bot_id: &BotId) -> StoreResult<Vec<Run>> {
        Ok(self
            .tables
            .read()
            .runs
            .values()
            .filter(|r| &r.bot_id == bot_id)
            .cloned()
            .collect())
    }

    async fn list_runs_by_agent(&self, agent_id: &AgentId) -> StoreResult<Vec<Run>> {
        Ok(self
            .tables
            .read()
            .runs
            .values()
            .filter(|r| r.agent_id.as_ref() == Some(agent_id))
            .cloned()
            .collect())
    }

    async fn find_scheduled_run(
        &self,
        bot_id: &BotId,
        start_time: DateTime<Utc>,
    ) -> StoreResult<Option<Run>> {
        Ok(self
            .tables
            .read()
            .runs
            .values()
            .find(|r| {
                r.status == RunStatus::Scheduled
                    && &r.bot_id == bot_id
                    && r.start_time == Some(start_time)
            })
            .cloned())
    }

    async fn list_due_scheduled(&self, now: DateTime<Utc>) -> StoreResult<Vec<Run>> {
        Ok(self
            .tables
            .read()
            .runs
            .values()
            .filter(|r| {
                r.status == RunStatus::Scheduled && r.start_time.is_some_and(|t| t <= now)
            })
            .cloned()
            .collect())
    }

    async fn list_queued(&self) -> StoreResult<Vec<Run>> {
        let mut queued: Vec<Run> = self
            .tables
            .read()
            .runs
            .values()
            .filter(|r| r.status == RunStatus::Queued)
            .cloned()
            .collect();
        // FIFO over scheduled time; id breaks ties deterministically.
        queued.sort_by(|a, b| {
            let ka = (a.start_time.unwrap_or(DateTime::<Utc>::MIN_UTC), a.id.as_str());
            let kb = (b.start_time.unwrap_or(DateTime::<Utc>::MIN_UTC), b.id.as_str());
            ka.cmp(&kb)
        });
        Ok(queued)
    }

    async fn list_stuck(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Run>> {
        Ok(self
            .tables
            .read()
            .runs
            .values()
            .filter(|r| {
                matches!(r.status, RunStatus::Starting | RunStatus::Running)
                    && r.start_time.is_some_and(|t| t < cutoff)
            })
            .cloned()
            .collect())
    }

    async fn append_run_event(&self, event: RunEvent) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if !tables.runs.contains_key(&event.run_id) {
            return Err(StoreError::not_found("run", event.run_id.as_str()));
        }
        tables.run_events.push(event);
        Ok(())
    }

    async fn list_run_events(&self, run_id: &RunId) -> StoreResult<Vec<RunEvent>> {
        Ok(self
            .tables
            .read()
            .run_events
            .iter()
            .filter(|e| &e.run_id == run_id)
            .cloned()
            .collect())
    }

    async fn append_run_log(&self, log: RunLog) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if !tables.runs.contains_key(&log.run_id) {
            return Err(StoreError::not_found("run", log.run_id.as_str()));
        }
        tables.run_logs.push(log);
        Ok(())
    }

    async fn list_run_logs(&self, run_id: &RunId) -> StoreResult<Vec<RunLog>> {
        Ok(self
            .tables
            .read()
            .run_logs
            .iter()
            .filter(|l| &l.run_id == run_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
