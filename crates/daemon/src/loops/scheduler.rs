// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materializes upcoming runs from bot cron schedules.

use crate::registry::{RegistryResult, RunRegistry};
use chrono::{DateTime, Utc};
use fleet_core::{schedule, Bot, Clock};
use fleet_storage::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// For each bot with a schedule, keeps exactly the next cron firing
/// materialized as a `scheduled` run. Only the single next firing is created
/// per pass, which keeps the scheduled set small and schedule edits cheap.
#[derive(Clone)]
pub struct Scheduler<C: Clock> {
    store: Arc<dyn Store>,
    runs: RunRegistry<C>,
    clock: C,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(store: Arc<dyn Store>, runs: RunRegistry<C>, clock: C) -> Self {
        Self { store, runs, clock }
    }

    /// One pass over every scheduled bot. A failing bot is logged and
    /// skipped; the others proceed.
    pub async fn tick(&self) -> RegistryResult<()> {
        let now = self.clock.now();
        for bot in self.store.list_scheduled_bots().await? {
            if let Err(e) = self.schedule_bot(&bot, now).await {
                warn!(bot = %bot.id, error = %e, "scheduling failed");
            }
        }
        Ok(())
    }

    async fn schedule_bot(&self, bot: &Bot, now: DateTime<Utc>) -> RegistryResult<()> {
        let Some(expr) = bot.schedule.as_deref() else {
            return Ok(());
        };
        let next = match schedule::next_fire(expr, now) {
            Ok(next) => next,
            Err(e) => {
                warn!(bot = %bot.id, schedule = expr, error = %e, "skipping invalid schedule");
                return Ok(());
            }
        };
        if self.store.find_scheduled_run(&bot.id, next).await?.is_some() {
            return Ok(());
        }
        let run = self.runs.schedule(bot.id.clone(), next).await?;
        debug!(bot = %bot.id, run = %run.id, fire = %next, "materialized run");
        Ok(())
    }

    /// Drive ticks until shutdown.
    pub async fn run(self, period: Duration, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        warn!(error = %e, "scheduler tick failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
