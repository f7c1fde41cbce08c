// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bot definition: a named, optionally scheduled unit of automation.

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::string_id! {
    /// Unique identifier for a bot definition.
    pub struct BotId("bot-");
}

/// A registered bot.
///
/// `script` is a symbolic identifier the agent side resolves to a runnable
/// module; the orchestrator never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub id: BotId,
    pub name: String,
    pub script: String,
    /// Five-field cron expression, validated at write time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Bot {
    pub fn new(
        name: impl Into<String>,
        script: impl Into<String>,
        schedule: Option<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: BotId::generate(),
            name: name.into(),
            script: script.into(),
            schedule,
            created_at: clock.now(),
        }
    }
}

crate::builder! {
    pub struct BotBuilder => Bot {
        into {
            name: String = "test-bot",
            script: String = "sample_bot",
        }
        set {
            id: BotId = BotId::generate(),
            created_at: DateTime<Utc> = DateTime::UNIX_EPOCH,
        }
        option {
            schedule: String = None,
        }
    }
}

#[cfg(test)]
#[path = "bot_tests.rs"]
mod tests;
