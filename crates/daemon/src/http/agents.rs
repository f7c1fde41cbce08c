// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent fleet endpoints.
//!
//! GET    /agents                - list all registered agents
//! POST   /agents/register       - upsert an agent (client-chosen id)
//! GET    /agents/available      - agents eligible for dispatch
//! GET    /agents/{id}           - one agent
//! GET    /agents/{id}/runs      - runs bound to this agent
//! POST   /agents/{id}/heartbeat - liveness ping
//! POST   /agents/{id}/status    - unconditional status assignment

use super::error::ApiResult;
use crate::app::App;
use axum::extract::{Path, State};
use axum::Json;
use fleet_core::{Agent, AgentId, AgentStatus, Clock, Run};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct RegisterAgentRequest {
    pub agent_id: AgentId,
    pub status: AgentStatus,
    #[serde(default)]
    pub resources: Map<String, Value>,
    pub public_url: String,
}

#[derive(Debug, Deserialize)]
pub struct AgentStatusRequest {
    pub status: AgentStatus,
}

pub async fn list<C: Clock>(State(app): State<App<C>>) -> ApiResult<Json<Vec<Agent>>> {
    Ok(Json(app.agents.list().await?))
}

pub async fn register<C: Clock>(
    State(app): State<App<C>>,
    Json(body): Json<RegisterAgentRequest>,
) -> ApiResult<Json<Agent>> {
    let agent = app
        .agents
        .register(body.agent_id, body.status, body.resources, body.public_url)
        .await?;
    Ok(Json(agent))
}

pub async fn available<C: Clock>(State(app): State<App<C>>) -> ApiResult<Json<Vec<Agent>>> {
    Ok(Json(app.agents.list_available().await?))
}

pub async fn get<C: Clock>(
    State(app): State<App<C>>,
    Path(agent_id): Path<AgentId>,
) -> ApiResult<Json<Agent>> {
    Ok(Json(app.agents.get(&agent_id).await?))
}

pub async fn runs<C: Clock>(
    State(app): State<App<C>>,
    Path(agent_id): Path<AgentId>,
) -> ApiResult<Json<Vec<Run>>> {
    Ok(Json(app.runs.list_by_agent(&agent_id).await?))
}

pub async fn heartbeat<C: Clock>(
    State(app): State<App<C>>,
    Path(agent_id): Path<AgentId>,
) -> ApiResult<Json<Agent>> {
    Ok(Json(app.agents.heartbeat(&agent_id).await?))
}

pub async fn set_status<C: Clock>(
    State(app): State<App<C>>,
    Path(agent_id): Path<AgentId>,
    Json(body): Json<AgentStatusRequest>,
) -> ApiResult<Json<Agent>> {
    Ok(Json(app.agents.set_status(&agent_id, body.status).await?))
}
