// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP error mapping for the public API.

use crate::registry::RegistryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleet_storage::StoreError;
use serde_json::json;
use tracing::error;

/// API-facing error; converts registry failures into status codes.
#[derive(Debug)]
pub struct ApiError(pub RegistryError);

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            RegistryError::NotFound { .. } => (StatusCode::NOT_FOUND, self.0.to_string()),
            RegistryError::InvalidSchedule(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            RegistryError::InvalidTransition { .. } => (StatusCode::CONFLICT, self.0.to_string()),
            RegistryError::Store(StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, self.0.to_string())
            }
            RegistryError::Store(StoreError::Backend(_)) => {
                // Details go to the log, not the wire.
                error!(error = %self.0, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
