//! Feed adapters and the concurrent fan-out over them.
//!
//! [`FeedAdapter::read`] is the fault-containment boundary: whatever goes
//! wrong inside (network, status, deadline, shape, empty payload) comes out
//! as the source's fallback reading with `status = unavailable`. Nothing
//! above this module ever sees a [`FeedError`].

use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use shdwnet_types::{FeedReading, FeedStatus, SourceId};
use tracing::{debug, warn};

use crate::client::FeedClient;
use crate::config::{FeedsConfig, LexiconConfig};
use crate::error::FeedError;
use crate::lexicon::LexiconSet;
use crate::parse::unit;
use crate::sources::{
    Extraction, extract_discussion, extract_kindex, extract_plasma, extract_seismic,
    extract_social, extract_solar,
};

/// Dispatch a parsed payload to its source's extractor and clamp the
/// resulting signal into `[0, 1]`.
///
/// # Errors
///
/// Any extractor error, or [`FeedError::ShapeMismatch`] if the computed
/// signal is not finite.
pub fn extract(
    source: SourceId,
    payload: &Value,
    lexicons: &LexiconSet,
) -> Result<Extraction, FeedError> {
    let mut extraction = match source {
        SourceId::SolarXray => extract_solar(payload),
        SourceId::KIndex => extract_kindex(payload),
        SourceId::Plasma => extract_plasma(payload),
        SourceId::Seismic => extract_seismic(payload),
        SourceId::Social => extract_social(payload, lexicons),
        SourceId::Discussion => extract_discussion(payload),
    }?;
    if !extraction.signal.is_finite() {
        return Err(FeedError::ShapeMismatch(format!(
            "non-finite signal from {source}"
        )));
    }
    extraction.signal = unit(extraction.signal);
    Ok(extraction)
}

/// One source bound to its endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedAdapter {
    source: SourceId,
    url: String,
}

impl FeedAdapter {
    /// Bind a source to a URL.
    pub fn new(source: SourceId, url: impl Into<String>) -> Self {
        Self {
            source,
            url: url.into(),
        }
    }

    /// The source this adapter reads.
    pub const fn source(&self) -> SourceId {
        self.source
    }

    /// Fetch, parse and normalize. Never fails; a failure produces the
    /// source's fallback reading.
    pub async fn read(&self, client: &FeedClient, lexicons: &LexiconSet) -> FeedReading {
        match self.try_read(client, lexicons).await {
            Ok(extraction) => {
                let status = if extraction.degraded {
                    FeedStatus::Degraded
                } else {
                    FeedStatus::Ok
                };
                debug!(
                    source = %self.source,
                    signal = extraction.signal,
                    ?status,
                    "feed read"
                );
                FeedReading {
                    source: self.source,
                    raw_metrics: Some(extraction.raw),
                    normalized_signal: extraction.signal,
                    status,
                    observed_at: Utc::now(),
                    failure: None,
                }
            }
            Err(e) => {
                warn!(
                    source = %self.source,
                    url = %self.url,
                    kind = e.kind(),
                    error = %e,
                    fallback = self.source.fallback_signal(),
                    "feed unavailable, using fallback"
                );
                FeedReading::unavailable(self.source, Utc::now(), e.to_string())
            }
        }
    }

    async fn try_read(
        &self,
        client: &FeedClient,
        lexicons: &LexiconSet,
    ) -> Result<Extraction, FeedError> {
        let payload = client.fetch_json(&self.url).await?;
        extract(self.source, &payload, lexicons)
    }
}

/// Every enabled adapter plus the shared client and lexicons.
#[derive(Debug, Clone)]
pub struct FeedSet {
    client: FeedClient,
    adapters: Vec<FeedAdapter>,
    lexicons: LexiconSet,
}

impl FeedSet {
    /// Build the adapters for the enabled sources, in configured order.
    /// Duplicate entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Network`] if the HTTP client cannot be built.
    pub fn from_config(feeds: &FeedsConfig, lexicon: &LexiconConfig) -> Result<Self, FeedError> {
        let client = FeedClient::new(feeds)?;
        let mut adapters: Vec<FeedAdapter> = Vec::with_capacity(feeds.enabled.len());
        for &source in &feeds.enabled {
            if adapters.iter().any(|a| a.source == source) {
                continue;
            }
            adapters.push(FeedAdapter::new(source, feeds.endpoints.url_for(source)));
        }
        Ok(Self {
            client,
            adapters,
            lexicons: LexiconSet::from_config(lexicon),
        })
    }

    /// The sources polled each cycle.
    pub fn sources(&self) -> Vec<SourceId> {
        self.adapters.iter().map(FeedAdapter::source).collect()
    }

    /// Read every adapter concurrently. Returns one reading per adapter in
    /// configured order, whatever the individual outcomes.
    pub async fn collect(&self) -> Vec<FeedReading> {
        join_all(
            self.adapters
                .iter()
                .map(|adapter| adapter.read(&self.client, &self.lexicons)),
        )
        .await
    }
}
