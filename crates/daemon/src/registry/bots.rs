// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bot definition registry.

use super::{RegistryError, RegistryResult};
use crate::bus::EventBus;
use fleet_core::schedule::validate_schedule;
use fleet_core::{Bot, BotId, BusEvent, Clock};
use fleet_storage::Store;
use std::sync::Arc;

/// CRUD over bot definitions. Cron expressions are validated at write time;
/// deleting a bot preserves its historical runs.
#[derive(Clone)]
pub struct BotRegistry<C: Clock> {
    store: Arc<dyn Store>,
    bus: EventBus,
    clock: C,
}

impl<C: Clock> BotRegistry<C> {
    pub fn new(store: Arc<dyn Store>, bus: EventBus, clock: C) -> Self {
        Self { store, bus, clock }
    }

    pub async fn create(
        &self,
        name: String,
        script: String,
        schedule: Option<String>,
    ) -> RegistryResult<Bot> {
        if let Some(expr) = schedule.as_deref() {
            validate_schedule(expr)?;
        }
        let bot = Bot::new(name, script, schedule, &self.clock);
        self.store.insert_bot(bot.clone()).await?;
        self.bus.publish(BusEvent::BotCreated { bot: bot.clone() });
        Ok(bot)
    }

    pub async fn get(&self, id: &BotId) -> RegistryResult<Bot> {
        self.store
            .get_bot(id)
            .await?
            .ok_or_else(|| RegistryError::not_found("bot", id.as_str()))
    }

    pub async fn list(&self) -> RegistryResult<Vec<Bot>> {
        Ok(self.store.list_bots().await?)
    }

    /// Partial update. The outer option marks field presence; for `schedule`
    /// the inner option distinguishes "set" from "clear".
    pub async fn update(
        &self,
        id: &BotId,
        name: Option<String>,
        script: Option<String>,
        schedule: Option<Option<String>>,
    ) -> RegistryResult<Bot> {
        if let Some(Some(expr)) = schedule.as_ref() {
            validate_schedule(expr)?;
        }
        let mut bot = self.get(id).await?;
        if let Some(name) = name {
            bot.name = name;
        }
        if let Some(script) = script {
            bot.script = script;
        }
        if let Some(schedule) = schedule {
            bot.schedule = schedule;
        }
        self.store.update_bot(bot.clone()).await?;
        self.bus.publish(BusEvent::BotUpdated { bot: bot.clone() });
        Ok(bot)
    }

    pub async fn delete(&self, id: &BotId) -> RegistryResult<()> {
        if !self.store.delete_bot(id).await? {
            return Err(RegistryError::not_found("bot", id.as_str()));
        }
        self.bus.publish(BusEvent::BotDeleted { bot_id: id.clone() });
        Ok(())
    }
}

#[cfg(test)]
#[path = "bots_tests.rs"]
mod tests;
