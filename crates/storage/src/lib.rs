// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fleet-storage: the persistence contract and the in-memory reference engine.
//!
//! The [`Store`] trait is the single source of truth for bots, agents, runs
//! and their telemetry. Registries cache nothing across requests; every
//! observable fact lives behind this trait so engines can be swapped without
//! touching the control plane.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleet_core::{Agent, AgentId, AgentStatus, Bot, BotId, Run, RunEvent, RunId, RunLog};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound { kind, id: id.into() }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent CRUD over the orchestrator's entities.
///
/// Query methods with a `list_` prefix return entities in insertion order
/// unless documented otherwise. All calls may suspend.
#[async_trait]
pub trait Store: Send + Sync {
    // -- bots --

    async fn insert_bot(&self, bot: Bot) -> StoreResult<()>;
    async fn get_bot(&self, id: &BotId) -> StoreResult<Option<Bot>>;
    /// Replace an existing bot record. `NotFound` if it was deleted.
    async fn update_bot(&self, bot: Bot) -> StoreResult<()>;
    /// Remove the bot record only; historical runs are preserved.
    async fn delete_bot(&self, id: &BotId) -> StoreResult<bool>;
    async fn list_bots(&self) -> StoreResult<Vec<Bot>>;
    /// Bots with a non-null schedule.
    async fn list_scheduled_bots(&self) -> StoreResult<Vec<Bot>>;

    // -- agents --

    async fn upsert_agent(&self, agent: Agent) -> StoreResult<Agent>;
    async fn get_agent(&self, id: &AgentId) -> StoreResult<Option<Agent>>;
    async fn list_agents(&self) -> StoreResult<Vec<Agent>>;
    /// Record a heartbeat; `last_heartbeat` is monotonically non-decreasing.
    async fn record_heartbeat(&self, id: &AgentId, at: DateTime<Utc>)
        -> StoreResult<Option<Agent>>;
    async fn set_agent_status(
        &self,
        id: &AgentId,
        status: AgentStatus,
    ) -> StoreResult<Option<Agent>>;
    /// Atomic compare-and-swap on status. Returns the updated agent on
    /// success, `None` when the current status differs from `expected` or the
    /// agent is unknown. This is the linearizability point for acquisition.
    async fn cas_agent_status(
        &self,
        id: &AgentId,
        expected: AgentStatus,
        next: AgentStatus,
    ) -> StoreResult<Option<Agent>>;
    /// Bulk-demote agents whose heartbeat predates `cutoff` to offline.
    /// Returns the rows that changed.
    async fn sweep_stale_agents(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Agent>>;

    // -- runs --

    async fn insert_run(&self, run: Run) -> StoreResult<()>;
    async fn get_run(&self, id: &RunId) -> StoreResult<Option<Run>>;
    async fn update_run(&self, run: Run) -> StoreResult<()>;
    async fn list_runs(&self) -> StoreResult<Vec<Run>>;
    async fn list_runs_by_bot(&self, bot_id: &BotId) -> StoreResult<Vec<Run>>;
    async fn list_runs_by_agent(&self, agent_id: &AgentId) -> StoreResult<Vec<Run>>;
    /// Scheduled run for `bot_id` with exactly this start time, if any
    /// (the scheduler's duplicate guard).
    async fn find_scheduled_run(
        &self,
        bot_id: &BotId,
        start_time: DateTime<Utc>,
    ) -> StoreResult<Option<Run>>;
    /// Scheduled runs whose start time has arrived.
    async fn list_due_scheduled(&self, now: DateTime<Utc>) -> StoreResult<Vec<Run>>;
    /// Queued runs ordered by `(start_time, id)` ascending.
    async fn list_queued(&self) -> StoreResult<Vec<Run>>;
    /// Starting/running runs whose start time predates `cutoff`.
    async fn list_stuck(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<Run>>;

    // -- run events and logs --

    /// Append-only; the referenced run must exist.
    async fn append_run_event(&self, event: RunEvent) -> StoreResult<()>;
    async fn list_run_events(&self, run_id: &RunId) -> StoreResult<Vec<RunEvent>>;
    /// Append-only; the referenced run must exist.
    async fn append_run_log(&self, log: RunLog) -> StoreResult<()>;
    async fn list_run_logs(&self, run_id: &RunId) -> StoreResult<Vec<RunLog>>;
}
