// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run lifecycle: a single execution attempt of a bot, plus the events and
//! log lines it produces.

use crate::agent::AgentId;
use crate::bot::BotId;
use crate::clock::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::string_id! {
    /// Unique identifier for a run instance.
    pub struct RunId("run-");
}

crate::string_id! {
    /// Unique identifier for a run event.
    pub struct RunEventId("evt-");
}

crate::string_id! {
    /// Unique identifier for a run log line.
    pub struct RunLogId("log-");
}

/// Lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created for a future cron firing
    Scheduled,
    /// Waiting for an agent
    Queued,
    /// Agent assigned, dispatch in flight or accepted
    Starting,
    /// Agent reported startup
    Running,
    /// Terminal: finished successfully
    Completed,
    /// Terminal: failed
    Error,
    /// Terminal: cancelled by an operator or agent
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Error | RunStatus::Cancelled)
    }

    /// Allowed lifecycle transitions; anything else is rejected.
    pub fn can_transition(self, next: RunStatus) -> bool {
        use RunStatus::*;
        matches!(
            (self, next),
            (Scheduled, Queued)
                | (Queued, Starting)
                | (Queued, Error)
                | (Queued, Cancelled)
                | (Starting, Running)
                | (Starting, Error)
                | (Starting, Cancelled)
                | (Running, Completed)
                | (Running, Error)
                | (Running, Cancelled)
        )
    }
}

crate::simple_display! {
    RunStatus {
        Scheduled => "scheduled",
        Queued => "queued",
        Starting => "starting",
        Running => "running",
        Completed => "completed",
        Error => "error",
        Cancelled => "cancelled",
    }
}

/// A single execution attempt of a bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub bot_id: BotId,
    /// Bound once dispatched; at most one non-terminal run per agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    pub status: RunStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Run {
    /// A run ready for immediate dispatch.
    pub fn queued(bot_id: BotId, clock: &impl Clock) -> Self {
        Self {
            id: RunId::generate(),
            bot_id,
            agent_id: None,
            status: RunStatus::Queued,
            start_time: Some(clock.now()),
            end_time: None,
        }
    }

    /// A run materialized for a future cron firing.
    pub fn scheduled(bot_id: BotId, start_time: DateTime<Utc>) -> Self {
        Self {
            id: RunId::generate(),
            bot_id,
            agent_id: None,
            status: RunStatus::Scheduled,
            start_time: Some(start_time),
            end_time: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Severity of a run log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

crate::simple_display! {
    LogLevel {
        Debug => "debug",
        Info => "info",
        Warning => "warning",
        Error => "error",
        Critical => "critical",
    }
}

/// A semantic milestone reported by an executing bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub id: RunEventId,
    pub run_id: RunId,
    pub event_type: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Base64-encoded PNG, if the bot captured one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A leveled log line from an executing bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub id: RunLogId,
    pub run_id: RunId,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

crate::builder! {
    pub struct RunBuilder => Run {
        set {
            id: RunId = RunId::generate(),
            bot_id: BotId = BotId::generate(),
            status: RunStatus = RunStatus::Queued,
            start_time: Option<DateTime<Utc>> = Some(DateTime::UNIX_EPOCH),
            end_time: Option<DateTime<Utc>> = None,
        }
        option {
            agent_id: AgentId = None,
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
