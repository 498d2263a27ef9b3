//! HTTP transport for the fal.ai edit endpoint.
//!
//! One [`EditTransport::post`] is exactly one HTTP round trip; retries live
//! in [`crate::client::FalEditClient`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use crate::config::FalConfig;
use crate::error::EditError;

/// Longest slice of an error body kept in a transport error.
const MAX_ERROR_BODY: usize = 500;

/// A single attempt at the remote edit call.
///
/// Returns the raw body of a 2xx response. Transport failures, timeouts and
/// non-2xx statuses are reported as errors.
#[async_trait]
pub trait EditTransport: Send + Sync {
    async fn post(&self, body: &serde_json::Value) -> Result<Vec<u8>, EditError>;
}

#[async_trait]
impl<T: EditTransport + ?Sized> EditTransport for Arc<T> {
    async fn post(&self, body: &serde_json::Value) -> Result<Vec<u8>, EditError> {
        (**self).post(body).await
    }
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpTransport {
    /// Build a transport whose client enforces the configured timeout.
    pub fn new(config: &FalConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing [`reqwest::Client`] (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, config: &FalConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`EditError::Transport`]
    /// carrying the status and (truncated) body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, EditError> {
        let status = response.status();
        if !status.is_success() {
            let mut body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            if let Some((cut, _)) = body.char_indices().nth(MAX_ERROR_BODY) {
                body.truncate(cut);
            }
            return Err(EditError::Transport(format!("HTTP {}: {body}", status.as_u16())));
        }
        Ok(response)
    }
}

#[async_trait]
impl EditTransport for HttpTransport {
    async fn post(&self, body: &serde_json::Value) -> Result<Vec<u8>, EditError> {
        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, format!("Key {}", self.api_key))
            .json(body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
