// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bot definition endpoints.
//!
//! GET    /bots            - list bot definitions
//! POST   /bots            - create (400 on invalid cron)
//! GET    /bots/{id}       - one bot
//! PUT    /bots/{id}       - partial update
//! DELETE /bots/{id}       - delete the definition, keep its runs
//! GET    /bots/{id}/runs  - run history
//! POST   /bots/{id}/runs  - queue an immediate run

use super::error::ApiResult;
use crate::app::App;
use axum::extract::{Path, State};
use axum::Json;
use fleet_core::{Bot, BotId, Clock, Run, RunId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct CreateBotRequest {
    pub name: String,
    pub script: String,
    #[serde(default)]
    pub schedule: Option<String>,
}

/// PUT body. A missing `schedule` leaves it alone; an explicit `null`
/// clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateBotRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default, with = "double_option")]
    pub schedule: Option<Option<String>>,
}

/// Distinguishes an absent JSON field from an explicit null.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(de).map(Some)
    }
}

#[derive(Debug, Serialize)]
pub struct RunQueuedResponse {
    pub run_id: RunId,
}

pub async fn list<C: Clock>(State(app): State<App<C>>) -> ApiResult<Json<Vec<Bot>>> {
    Ok(Json(app.bots.list().await?))
}

pub async fn create<C: Clock>(
    State(app): State<App<C>>,
    Json(body): Json<CreateBotRequest>,
) -> ApiResult<Json<Bot>> {
    Ok(Json(app.bots.create(body.name, body.script, body.schedule).await?))
}

pub async fn get<C: Clock>(
    State(app): State<App<C>>,
    Path(bot_id): Path<BotId>,
) -> ApiResult<Json<Bot>> {
    Ok(Json(app.bots.get(&bot_id).await?))
}

pub async fn update<C: Clock>(
    State(app): State<App<C>>,
    Path(bot_id): Path<BotId>,
    Json(body): Json<UpdateBotRequest>,
) -> ApiResult<Json<Bot>> {
    Ok(Json(app.bots.update(&bot_id, body.name, body.script, body.schedule).await?))
}

pub async fn remove<C: Clock>(
    State(app): State<App<C>>,
    Path(bot_id): Path<BotId>,
) -> ApiResult<Json<Value>> {
    app.bots.delete(&bot_id).await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn runs<C: Clock>(
    State(app): State<App<C>>,
    Path(bot_id): Path<BotId>,
) -> ApiResult<Json<Vec<Run>>> {
    Ok(Json(app.runs.list_by_bot(&bot_id).await?))
}

/// Queue an immediate run; the next dispatcher pass picks it up.
pub async fn queue_run<C: Clock>(
    State(app): State<App<C>>,
    Path(bot_id): Path<BotId>,
) -> ApiResult<Json<RunQueuedResponse>> {
    let bot = app.bots.get(&bot_id).await?;
    let run = app.runs.create(bot.id).await?;
    Ok(Json(RunQueuedResponse { run_id: run.id }))
}
