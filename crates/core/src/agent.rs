// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker agent record and liveness policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

crate::string_id! {
    /// Client-chosen identifier for a worker agent.
    pub struct AgentId;
}

/// Status of a worker agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Ready to take a run
    Available,
    /// Currently executing a run
    Busy,
    /// Deliberately taken out of rotation
    Stopped,
    /// Heartbeats went silent; demoted by the janitor
    Offline,
}

crate::simple_display! {
    AgentStatus {
        Available => "available",
        Busy => "busy",
        Stopped => "stopped",
        Offline => "offline",
    }
}

/// A worker process registered with the orchestrator.
///
/// The orchestrator dispatches runs by POSTing to `public_url`; everything
/// else about the process is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: AgentId,
    pub status: AgentStatus,
    /// Opaque capability map reported by the agent (cpu, memory, drivers).
    #[serde(default)]
    pub resources: Map<String, Value>,
    pub public_url: String,
    pub last_heartbeat: DateTime<Utc>,
}

impl Agent {
    fn heartbeat_age_ms(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.last_heartbeat).num_milliseconds()
    }

    /// Authoritative liveness test: a heartbeat within twice the interval.
    pub fn is_live(&self, now: DateTime<Utc>, heartbeat_interval: Duration) -> bool {
        self.heartbeat_age_ms(now) <= 2 * heartbeat_interval.as_millis() as i64
    }

    /// Stale agents get demoted to offline; the cutoff is five intervals and
    /// never relaxes the stricter [`Agent::is_live`] check.
    pub fn is_stale(&self, now: DateTime<Utc>, heartbeat_interval: Duration) -> bool {
        self.heartbeat_age_ms(now) > 5 * heartbeat_interval.as_millis() as i64
    }
}

crate::builder! {
    pub struct AgentBuilder => Agent {
        into {
            agent_id: AgentId = "agent-1",
            public_url: String = "http://agent-1.local:9000",
        }
        set {
            status: AgentStatus = AgentStatus::Available,
            resources: Map<String, Value> = Map::new(),
            last_heartbeat: DateTime<Utc> = DateTime::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
