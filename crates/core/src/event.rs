// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus events fanned out to observer streams after every state change.

use crate::agent::{Agent, AgentId};
use crate::bot::{Bot, BotId};
use crate::run::{Run, RunEvent, RunLog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An observer-facing notification.
///
/// Serializes with `{"type": "run.updated", ...fields}` format; the tag
/// doubles as the topic name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BusEvent {
    #[serde(rename = "bot.created")]
    BotCreated { bot: Bot },

    #[serde(rename = "bot.updated")]
    BotUpdated { bot: Bot },

    #[serde(rename = "bot.deleted")]
    BotDeleted { bot_id: BotId },

    #[serde(rename = "agent.updated")]
    AgentUpdated { agent: Agent },

    /// Free-form agent diagnostics; relayed to observers, never persisted.
    #[serde(rename = "agent.log_created")]
    AgentLogCreated { agent_id: AgentId, message: String, timestamp: DateTime<Utc> },

    #[serde(rename = "run.created")]
    RunCreated { run: Run },

    #[serde(rename = "run.updated")]
    RunUpdated { run: Run },

    #[serde(rename = "run.event_created")]
    RunEventCreated { event: RunEvent },

    #[serde(rename = "run.log_created")]
    RunLogCreated { log: RunLog },
}

impl BusEvent {
    /// Topic string, identical to the serialized `type` tag.
    pub fn topic(&self) -> &'static str {
        match self {
            BusEvent::BotCreated { .. } => "bot.created",
            BusEvent::BotUpdated { .. } => "bot.updated",
            BusEvent::BotDeleted { .. } => "bot.deleted",
            BusEvent::AgentUpdated { .. } => "agent.updated",
            BusEvent::AgentLogCreated { .. } => "agent.log_created",
            BusEvent::RunCreated { .. } => "run.created",
            BusEvent::RunUpdated { .. } => "run.updated",
            BusEvent::RunEventCreated { .. } => "run.event_created",
            BusEvent::RunLogCreated { .. } => "run.log_created",
        }
    }

    /// One-line summary for trace logging.
    pub fn log_summary(&self) -> String {
        let t = self.topic();
        match self {
            BusEvent::BotCreated { bot } | BusEvent::BotUpdated { bot } => {
                format!("{t} bot={} name={}", bot.id, bot.name)
            }
            BusEvent::BotDeleted { bot_id } => format!("{t} bot={bot_id}"),
            BusEvent::AgentUpdated { agent } => {
                format!("{t} agent={} status={}", agent.agent_id, agent.status)
            }
            BusEvent::AgentLogCreated { agent_id, .. } => format!("{t} agent={agent_id}"),
            BusEvent::RunCreated { run } | BusEvent::RunUpdated { run } => {
                format!("{t} run={} status={}", run.id, run.status)
            }
            BusEvent::RunEventCreated { event } => {
                format!("{t} run={} kind={}", event.run_id, event.event_type)
            }
            BusEvent::RunLogCreated { log } => {
                format!("{t} run={} level={}", log.run_id, log.level)
            }
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
