// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registries owning entity lifecycles.
//!
//! Each registry wraps the store and the bus: every mutation is one store
//! write followed by one bus publish, so observers track persisted state.
//! Registries never call each other; the loops and the router compose them.

mod agents;
mod bots;
mod runs;

pub use agents::AgentRegistry;
pub use bots::BotRegistry;
pub use runs::RunRegistry;

use fleet_core::schedule::ScheduleError;
use fleet_core::RunStatus;
use fleet_storage::StoreError;
use thiserror::Error;

/// Errors surfaced by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),

    #[error("illegal run transition: {from} -> {to}")]
    InvalidTransition { from: RunStatus, to: RunStatus },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        RegistryError::NotFound { kind, id: id.into() }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
