// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client over the daemon's `/tools` dispatch endpoint.
//!
//! Sends a `Request`, decodes the wire boundary's `Outcome<T>` flattening
//! into either the success payload or a `ClientError`.

use std::time::Duration;

use pp_wire::Request;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// How long `DaemonClient::connect_with_retry` keeps retrying before
/// giving up, per spec.md §4.8 step 3's "retry window (~10s)".
pub const CONNECT_RETRY_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach persistproc daemon at {0}")]
    Unreachable(String),
    #[error("{0}")]
    Tool(String),
    #[error("unexpected response from daemon: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Unreachable(_))
    }
}

#[derive(Clone)]
pub struct DaemonClient {
    http: reqwest::Client,
    base_url: String,
    port: u16,
}

impl DaemonClient {
    pub fn new(port: u16) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("http://127.0.0.1:{port}"),
            port,
        }
    }

    /// The port this client talks to, used to compose the "start the
    /// server with..." guidance message on `ClientError::Unreachable`.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Posts `request` to `/tools` and decodes the success shape, or
    /// surfaces the daemon's `{"error": "..."}` as `ClientError::Tool`.
    pub async fn send<T: DeserializeOwned>(&self, request: &Request) -> Result<T, ClientError> {
        let response = self
            .http
            .post(format!("{}/tools", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|err| ClientError::Unreachable(err.to_string()))?;

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))?;

        if let Some(error) = value.get("error").and_then(|v| v.as_str()) {
            return Err(ClientError::Tool(error.to_string()));
        }

        serde_json::from_value(value).map_err(|err| ClientError::Decode(err.to_string()))
    }

    /// Retries `send` for up to [`CONNECT_RETRY_WINDOW`], for the race
    /// between a client starting and a server that was just launched
    /// (spec.md §4.8 step 3). Any non-connection error (including a tool
    /// error) returns immediately.
    pub async fn send_with_retry<T: DeserializeOwned>(
        &self,
        request: &Request,
    ) -> Result<T, ClientError> {
        let deadline = tokio::time::Instant::now() + CONNECT_RETRY_WINDOW;
        loop {
            match self.send(request).await {
                Err(ClientError::Unreachable(_)) if tokio::time::Instant::now() < deadline => {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                result => return result,
            }
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
