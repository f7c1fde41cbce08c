// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run endpoints.
//!
//! GET    /runs               - all runs
//! GET    /runs/{id}          - one run
//! GET    /runs/{id}/logs     - log lines for a run
//! POST   /runs/{id}/logs     - append a log line
//! GET    /runs/{id}/events   - milestones for a run
//! POST   /runs/{id}/events   - append a milestone
//! POST   /runs/{id}/status   - request a lifecycle transition

use super::error::ApiResult;
use crate::app::App;
use axum::extract::{Path, State};
use axum::Json;
use fleet_core::{Clock, LogLevel, Run, RunEvent, RunId, RunLog, RunStatus};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct CreateRunLogRequest {
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRunEventRequest {
    pub event_type: String,
    pub message: String,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub screenshot: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RunStatusRequest {
    pub status: RunStatus,
}

pub async fn list<C: Clock>(State(app): State<App<C>>) -> ApiResult<Json<Vec<Run>>> {
    Ok(Json(app.runs.list().await?))
}

pub async fn get<C: Clock>(
    State(app): State<App<C>>,
    Path(run_id): Path<RunId>,
) -> ApiResult<Json<Run>> {
    Ok(Json(app.runs.get(&run_id).await?))
}

pub async fn logs<C: Clock>(
    State(app): State<App<C>>,
    Path(run_id): Path<RunId>,
) -> ApiResult<Json<Vec<RunLog>>> {
    Ok(Json(app.runs.logs(&run_id).await?))
}

pub async fn add_log<C: Clock>(
    State(app): State<App<C>>,
    Path(run_id): Path<RunId>,
    Json(body): Json<CreateRunLogRequest>,
) -> ApiResult<Json<RunLog>> {
    let log = app.runs.record_log(run_id, body.level, body.message, body.payload).await?;
    Ok(Json(log))
}

pub async fn events<C: Clock>(
    State(app): State<App<C>>,
    Path(run_id): Path<RunId>,
) -> ApiResult<Json<Vec<RunEvent>>> {
    Ok(Json(app.runs.events(&run_id).await?))
}

pub async fn add_event<C: Clock>(
    State(app): State<App<C>>,
    Path(run_id): Path<RunId>,
    Json(body): Json<CreateRunEventRequest>,
) -> ApiResult<Json<RunEvent>> {
    let event = app
        .runs
        .record_event(run_id, body.event_type, body.message, body.payload, body.screenshot)
        .await?;
    Ok(Json(event))
}

pub async fn set_status<C: Clock>(
    State(app): State<App<C>>,
    Path(run_id): Path<RunId>,
    Json(body): Json<RunStatusRequest>,
) -> ApiResult<Json<Run>> {
    Ok(Json(app.runs.set_status(&run_id, body.status).await?))
}
