// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Public HTTP surface; thin delegation to the registries.

mod agents;
mod bots;
mod error;
mod runs;
mod stream;

pub use error::{ApiError, ApiResult};

use crate::app::App;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use fleet_core::Clock;

/// Liveness probe with bus fan-out metrics.
async fn health<C: Clock>(State(app): State<App<C>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "events_dropped": app.bus.dropped_total(),
    }))
}

pub fn router<C: Clock>(app: App<C>) -> Router {
    Router::new()
        .route("/health", get(health::<C>))
        .route("/agents", get(agents::list::<C>))
        .route("/agents/register", post(agents::register::<C>))
        .route("/agents/available", get(agents::available::<C>))
        .route("/agents/{agent_id}", get(agents::get::<C>))
        .route("/agents/{agent_id}/runs", get(agents::runs::<C>))
        .route("/agents/{agent_id}/heartbeat", post(agents::heartbeat::<C>))
        .route("/agents/{agent_id}/status", post(agents::set_status::<C>))
        .route("/bots", get(bots::list::<C>).post(bots::create::<C>))
        .route(
            "/bots/{bot_id}",
            get(bots::get::<C>).put(bots::update::<C>).delete(bots::remove::<C>),
        )
        .route("/bots/{bot_id}/runs", get(bots::runs::<C>).post(bots::queue_run::<C>))
        .route("/runs", get(runs::list::<C>))
        .route("/runs/{run_id}", get(runs::get::<C>))
        .route("/runs/{run_id}/logs", get(runs::logs::<C>).post(runs::add_log::<C>))
        .route("/runs/{run_id}/events", get(runs::events::<C>).post(runs::add_event::<C>))
        .route("/runs/{run_id}/status", post(runs::set_status::<C>))
        .route("/ws/ui", get(stream::ui::<C>))
        .route("/ws/agent", get(stream::agent::<C>))
        .with_state(app)
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
