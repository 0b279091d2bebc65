//! Best-effort push of the master signal to a downstream consumer.
//!
//! After every cycle the scheduler hands the signal to [`HttpSignalSink`],
//! which POSTs `{"value": <signal>}` on a spawned task. Failures are logged
//! and dropped; the cycle never waits on the push.

use std::time::Duration;

use shdwnet_core::config::DownstreamConfig;
use shdwnet_core::sink::SignalSink;
use shdwnet_types::MasterSignal;
use tracing::{debug, warn};

/// Errors from the downstream push.
#[derive(Debug, thiserror::Error)]
pub enum DownstreamError {
    /// The HTTP client could not be built or the request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The consumer answered with a non-success status.
    #[error("consumer returned HTTP {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },
}

/// POSTs each master signal to a configured URL.
#[derive(Debug, Clone)]
pub struct HttpSignalSink {
    client: reqwest::Client,
    url: String,
}

impl HttpSignalSink {
    /// Build the sink, or `None` when no URL is configured.
    pub fn from_config(config: &DownstreamConfig) -> Result<Option<Self>, DownstreamError> {
        let Some(url) = config
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
        else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Some(Self {
            client,
            url: url.to_owned(),
        }))
    }

    /// Send one signal and wait for the response.
    pub async fn send(&self, signal: MasterSignal) -> Result<(), DownstreamError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "value": signal.value() }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownstreamError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

impl SignalSink for HttpSignalSink {
    fn push(&self, signal: MasterSignal) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no runtime available, dropping downstream push");
            return;
        };
        let sink = self.clone();
        runtime.spawn(async move {
            match sink.send(signal).await {
                Ok(()) => debug!(url = %sink.url, value = signal.value(), "Signal pushed"),
                Err(e) => warn!(url = %sink.url, error = %e, "Downstream push failed"),
            }
        });
    }
}
