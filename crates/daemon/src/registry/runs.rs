// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run lifecycle registry: owns the state machine and its notifications.

use super::{RegistryError, RegistryResult};
use crate::bus::EventBus;
use chrono::{DateTime, Utc};
use fleet_core::{
    AgentId, BotId, BusEvent, Clock, LogLevel, Run, RunEvent, RunEventId, RunId, RunLog, RunLogId,
    RunStatus,
};
use fleet_storage::Store;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Owns run records and validates every transition against the lifecycle.
///
/// Mutations are serialized through one async mutex, so a client observing
/// `run.updated` events for a fixed run sees a monotone status sequence.
#[derive(Clone)]
pub struct RunRegistry<C: Clock> {
    store: Arc<dyn Store>,
    bus: EventBus,
    clock: C,
    mutate: Arc<Mutex<()>>,
}

impl<C: Clock> RunRegistry<C> {
    pub fn new(store: Arc<dyn Store>, bus: EventBus, clock: C) -> Self {
        Self { store, bus, clock, mutate: Arc::new(Mutex::new(())) }
    }

    /// Create a run ready for immediate dispatch.
    pub async fn create(&self, bot_id: BotId) -> RegistryResult<Run> {
        let run = Run::queued(bot_id, &self.clock);
        self.store.insert_run(run.clone()).await?;
        self.bus.publish(BusEvent::RunCreated { run: run.clone() });
        Ok(run)
    }

    /// Create a run for a future cron firing.
    pub async fn schedule(&self, bot_id: BotId, start_time: DateTime<Utc>) -> RegistryResult<Run> {
        let run = Run::scheduled(bot_id, start_time);
        self.store.insert_run(run.clone()).await?;
        self.bus.publish(BusEvent::RunCreated { run: run.clone() });
        Ok(run)
    }

    pub async fn get(&self, id: &RunId) -> RegistryResult<Run> {
        self.store
            .get_run(id)
            .await?
            .ok_or_else(|| RegistryError::not_found("run", id.as_str()))
    }

    pub async fn list(&self) -> RegistryResult<Vec<Run>> {
        Ok(self.store.list_runs().await?)
    }

    pub async fn list_by_bot(&self, bot_id: &BotId) -> RegistryResult<Vec<Run>> {
        Ok(self.store.list_runs_by_bot(bot_id).await?)
    }

    pub async fn list_by_agent(&self, agent_id: &AgentId) -> RegistryResult<Vec<Run>> {
        Ok(self.store.list_runs_by_agent(agent_id).await?)
    }

    /// Promote a scheduled run whose start time has arrived. Keeps
    /// `start_time` so queue draining stays FIFO over scheduled time.
    pub async fn promote(&self, id: &RunId) -> RegistryResult<Run> {
        let _serialized = self.mutate.lock().await;
        let mut run = self.get(id).await?;
        self.check_transition(&run, RunStatus::Queued)?;
        run.status = RunStatus::Queued;
        self.store.update_run(run.clone()).await?;
        self.bus.publish(BusEvent::RunUpdated { run: run.clone() });
        Ok(run)
    }

    /// Bind an agent and mark the run starting.
    pub async fn assign(&self, id: &RunId, agent_id: AgentId) -> RegistryResult<Run> {
        let _serialized = self.mutate.lock().await;
        let mut run = self.get(id).await?;
        self.check_transition(&run, RunStatus::Starting)?;
        run.status = RunStatus::Starting;
        run.agent_id = Some(agent_id);
        self.store.update_run(run.clone()).await?;
        self.bus.publish(BusEvent::RunUpdated { run: run.clone() });
        Ok(run)
    }

    /// Apply a reported status change.
    ///
    /// Repeating the current status is a no-op so replayed agent messages are
    /// harmless; `cancelled` against a terminal run returns the run
    /// unchanged. Terminal statuses stamp `end_time`; entering `running`
    /// appends an informational run event.
    pub async fn set_status(&self, id: &RunId, status: RunStatus) -> RegistryResult<Run> {
        let _serialized = self.mutate.lock().await;
        let mut run = self.get(id).await?;
        if run.status == status {
            return Ok(run);
        }
        if run.is_terminal() && status == RunStatus::Cancelled {
            return Ok(run);
        }
        // Starting is only reachable through assignment, which binds the agent.
        if status == RunStatus::Starting {
            return Err(RegistryError::InvalidTransition { from: run.status, to: status });
        }
        self.check_transition(&run, status)?;
        run.status = status;
        if status.is_terminal() {
            run.end_time = Some(self.clock.now());
        }
        self.store.update_run(run.clone()).await?;
        if status == RunStatus::Running {
            self.append_event(&run.id, "info", "run started", None, None).await?;
        }
        self.bus.publish(BusEvent::RunUpdated { run: run.clone() });
        Ok(run)
    }

    /// Fail a run, stamping `end_time` and recording the reason as an error
    /// event. Already-terminal runs are left untouched.
    pub async fn fail(&self, id: &RunId, reason: &str) -> RegistryResult<Run> {
        let current = self.get(id).await?;
        if current.is_terminal() {
            return Ok(current);
        }
        let run = self.set_status(id, RunStatus::Error).await?;
        self.append_event(&run.id, "error", reason, None, None).await?;
        Ok(run)
    }

    /// Append a milestone event reported by the executing bot.
    pub async fn record_event(
        &self,
        run_id: RunId,
        event_type: String,
        message: String,
        payload: Option<Value>,
        screenshot: Option<String>,
    ) -> RegistryResult<RunEvent> {
        let event = RunEvent {
            id: RunEventId::generate(),
            run_id,
            event_type,
            message,
            payload,
            screenshot,
            timestamp: self.clock.now(),
        };
        self.store.append_run_event(event.clone()).await?;
        self.bus.publish(BusEvent::RunEventCreated { event: event.clone() });
        Ok(event)
    }

    /// Append a leveled log line reported by the executing bot.
    pub async fn record_log(
        &self,
        run_id: RunId,
        level: LogLevel,
        message: String,
        payload: Option<Value>,
    ) -> RegistryResult<RunLog> {
        let log = RunLog {
            id: RunLogId::generate(),
            run_id,
            level,
            message,
            payload,
            timestamp: self.clock.now(),
        };
        self.store.append_run_log(log.clone()).await?;
        self.bus.publish(BusEvent::RunLogCreated { log: log.clone() });
        Ok(log)
    }

    pub async fn events(&self, run_id: &RunId) -> RegistryResult<Vec<RunEvent>> {
        Ok(self.store.list_run_events(run_id).await?)
    }

    pub async fn logs(&self, run_id: &RunId) -> RegistryResult<Vec<RunLog>> {
        Ok(self.store.list_run_logs(run_id).await?)
    }

    fn check_transition(&self, run: &Run, next: RunStatus) -> RegistryResult<()> {
        if run.status.can_transition(next) {
            Ok(())
        } else {
            Err(RegistryError::InvalidTransition { from: run.status, to: next })
        }
    }

    async fn append_event(
        &self,
        run_id: &RunId,
        event_type: &str,
        message: &str,
        payload: Option<Value>,
        screenshot: Option<String>,
    ) -> RegistryResult<()> {
        let event = RunEvent {
            id: RunEventId::generate(),
            run_id: run_id.clone(),
            event_type: event_type.to_string(),
            message: message.to_string(),
            payload,
            screenshot,
            timestamp: self.clock.now(),
        };
        self.store.append_run_event(event.clone()).await?;
        self.bus.publish(BusEvent::RunEventCreated { event });
        Ok(())
    }
}

#[cfg(test)]
#[path = "runs_tests.rs"]
mod tests;
