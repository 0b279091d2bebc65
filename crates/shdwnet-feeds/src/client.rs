//! HTTP client shared by every adapter.
//!
//! One `reqwest::Client` is built per [`FeedSet`](crate::adapter::FeedSet)
//! so connections are pooled across adapters and cycles. Each fetch is
//! bounded by the configured deadline via `tokio::time::timeout`.

use std::time::Duration;

use serde_json::Value;
use tokio::time::timeout;

use crate::config::FeedsConfig;
use crate::error::FeedError;

/// JSON-over-HTTP fetcher with a per-request deadline.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    timeout_ms: u64,
}

impl FeedClient {
    /// Build a client with the configured user agent and deadline.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Network`] if the TLS backend cannot be
    /// initialized.
    pub fn new(config: &FeedsConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FeedError::Network(format!("client build failed: {e}")))?;
        Ok(Self {
            client,
            timeout_ms: config.timeout_ms,
        })
    }

    /// The per-request deadline in milliseconds.
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// GET a URL and parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Timeout`] when the deadline passes,
    /// [`FeedError::Network`] when the request or body read fails,
    /// [`FeedError::HttpStatus`] on a non-success status and
    /// [`FeedError::Parse`] when the body is not JSON.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, FeedError> {
        let deadline = Duration::from_millis(self.timeout_ms);
        match timeout(deadline, self.fetch_inner(url)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(FeedError::Timeout {
                timeout_ms: self.timeout_ms,
            }),
        }
    }

    /// Fetch without the deadline wrapper.
    async fn fetch_inner(&self, url: &str) -> Result<Value, FeedError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FeedError::Network(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Network(format!("body read failed: {e}")))?;

        Ok(serde_json::from_slice(&body)?)
    }
}
