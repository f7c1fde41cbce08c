// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound dispatch calls to agent processes.

use async_trait::async_trait;
use fleet_wire::StartRunRequest;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("agent returned status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(String),
}

/// Hands a run off to an agent through its public URL.
///
/// Any error — timeout, connection refused, non-2xx — is a dispatch failure;
/// the dispatcher fails the run and frees the agent.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn start_run(
        &self,
        public_url: &str,
        request: &StartRunRequest,
    ) -> Result<(), TransportError>;
}

/// reqwest-backed transport with a per-dispatch deadline.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn start_run(
        &self,
        public_url: &str,
        request: &StartRunRequest,
    ) -> Result<(), TransportError> {
        let url = format!("{}/run", public_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Transport fake that records dispatches and fails on demand.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct RecordingTransport {
    calls: parking_lot::Mutex<Vec<(String, StartRunRequest)>>,
    /// Status codes to fail with, consumed in dispatch order.
    fail_next: parking_lot::Mutex<Vec<u16>>,
    /// URLs that always refuse dispatch, with the status to refuse with.
    fail_urls: parking_lot::Mutex<std::collections::HashMap<String, u16>>,
}

#[cfg(any(test, feature = "test-support"))]
impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next dispatch (then go back to accepting).
    pub fn fail_next(&self, status: u16) {
        self.fail_next.lock().push(status);
    }

    /// Fail every dispatch aimed at `public_url`.
    pub fn fail_url(&self, public_url: impl Into<String>, status: u16) {
        self.fail_urls.lock().insert(public_url.into(), status);
    }

    /// Every dispatch seen so far, in order.
    pub fn calls(&self) -> Vec<(String, StartRunRequest)> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl Transport for RecordingTransport {
    async fn start_run(
        &self,
        public_url: &str,
        request: &StartRunRequest,
    ) -> Result<(), TransportError> {
        self.calls.lock().push((public_url.to_string(), request.clone()));
        if let Some(status) = self.fail_urls.lock().get(public_url) {
            return Err(TransportError::Status(*status));
        }
        let queued = {
            let mut fail_next = self.fail_next.lock();
            if fail_next.is_empty() { None } else { Some(fail_next.remove(0)) }
        };
        match queued {
            Some(status) => Err(TransportError::Status(status)),
            None => Ok(()),
        }
    }
}
