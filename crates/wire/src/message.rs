// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-originated socket frames and the dispatch payload.
//!
//! Inbound frames are JSON objects tagged by `type`. Decoding is total:
//! malformed input becomes a [`WireError`] so the connection handler can
//! drop the frame without tearing anything down.

use fleet_core::{AgentId, BotId, LogLevel, RunId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed agent message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A message sent by an agent over its socket connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentMessage {
    /// Periodic liveness proof.
    #[serde(rename = "agent.heartbeat")]
    Heartbeat { agent_id: AgentId },

    /// Explicit status report (e.g. stopping for maintenance).
    #[serde(rename = "agent.status")]
    StatusUpdate { agent_id: AgentId, status: fleet_core::AgentStatus },

    /// Free-form diagnostics; relayed to observers, never persisted.
    #[serde(rename = "agent.log")]
    AgentLog { agent_id: AgentId, message: String },

    /// Milestone from an executing bot.
    #[serde(rename = "run.event")]
    RunEvent {
        run_id: RunId,
        event_type: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
        /// Base64-encoded PNG.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        screenshot: Option<String>,
    },

    /// Leveled log line from an executing bot.
    #[serde(rename = "run.log")]
    RunLog {
        run_id: RunId,
        level: LogLevel,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },

    /// Lifecycle report; terminal statuses also free the agent.
    #[serde(rename = "run.status")]
    RunStatus { run_id: RunId, status: fleet_core::RunStatus },
}

/// Decode one text frame.
pub fn decode(text: &str) -> Result<AgentMessage, WireError> {
    Ok(serde_json::from_str(text)?)
}

/// Body of the dispatch call `POST {agent.public_url}/run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartRunRequest {
    pub bot_id: BotId,
    pub script: String,
    pub run_id: RunId,
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "property_tests.rs"]
mod property_tests;
