// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routes agent-originated socket messages into the registries.

use crate::bus::EventBus;
use crate::registry::{AgentRegistry, RegistryResult, RunRegistry};
use fleet_core::{BusEvent, Clock};
use fleet_wire::AgentMessage;
use tracing::warn;

/// The single consumer of the agent-inbound channel.
///
/// Every message kind is idempotent under replay; malformed frames are
/// logged and dropped so bad input never takes down a connection.
#[derive(Clone)]
pub struct InboundRouter<C: Clock> {
    agents: AgentRegistry<C>,
    runs: RunRegistry<C>,
    bus: EventBus,
    clock: C,
}

impl<C: Clock> InboundRouter<C> {
    pub fn new(agents: AgentRegistry<C>, runs: RunRegistry<C>, bus: EventBus, clock: C) -> Self {
        Self { agents, runs, bus, clock }
    }

    /// Decode and apply one raw text frame.
    pub async fn handle_frame(&self, text: &str) {
        match fleet_wire::decode(text) {
            Ok(message) => {
                if let Err(e) = self.handle(message).await {
                    warn!(error = %e, "agent message rejected");
                }
            }
            Err(e) => warn!(error = %e, "dropping malformed agent frame"),
        }
    }

    /// Apply a decoded agent message.
    pub async fn handle(&self, message: AgentMessage) -> RegistryResult<()> {
        match message {
            AgentMessage::Heartbeat { agent_id } => {
                self.agents.heartbeat(&agent_id).await?;
            }
            AgentMessage::StatusUpdate { agent_id, status } => {
                self.agents.set_status(&agent_id, status).await?;
            }
            AgentMessage::AgentLog { agent_id, message } => {
                self.bus.publish(BusEvent::AgentLogCreated {
                    agent_id,
                    message,
                    timestamp: self.clock.now(),
                });
            }
            AgentMessage::RunEvent { run_id, event_type, message, payload, screenshot } => {
                self.runs.record_event(run_id, event_type, message, payload, screenshot).await?;
            }
            AgentMessage::RunLog { run_id, level, message, payload } => {
                self.runs.record_log(run_id, level, message, payload).await?;
            }
            AgentMessage::RunStatus { run_id, status } => {
                let run = self.runs.set_status(&run_id, status).await?;
                // A finished run frees its agent; release is a no-op when the
                // agent already moved on.
                if run.is_terminal() {
                    if let Some(agent_id) = run.agent_id.as_ref() {
                        self.agents.release(agent_id).await?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
