//! Error types for the feed adapters.
//!
//! Every variant stays inside the adapter boundary: [`FeedAdapter::read`]
//! turns any of them into the source's fallback reading.
//!
//! [`FeedAdapter::read`]: crate::adapter::FeedAdapter::read

/// Errors that can occur while fetching or parsing a feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The request could not be sent or the body could not be read.
    #[error("network failure: {0}")]
    Network(String),

    /// The fetch did not finish within the adapter deadline.
    #[error("timed out after {timeout_ms}ms")]
    Timeout {
        /// The deadline in milliseconds.
        timeout_ms: u64,
    },

    /// The server answered with a non-success status.
    #[error("HTTP status {status}")]
    HttpStatus {
        /// The status code.
        status: u16,
    },

    /// The payload is valid JSON but not the expected shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The payload is not valid JSON.
    #[error("parse failure: {0}")]
    Parse(#[from] serde_json::Error),

    /// The payload parsed but held nothing to read.
    #[error("empty dataset")]
    EmptyDataset,
}

impl FeedError {
    /// Coarse failure class for structured logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) | Self::Timeout { .. } | Self::HttpStatus { .. } => "network",
            Self::ShapeMismatch(_) | Self::Parse(_) => "shape",
            Self::EmptyDataset => "empty",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_collapse_into_three_classes() {
        assert_eq!(FeedError::Timeout { timeout_ms: 5 }.kind(), "network");
        assert_eq!(FeedError::HttpStatus { status: 503 }.kind(), "network");
        assert_eq!(FeedError::ShapeMismatch("x".to_owned()).kind(), "shape");
        assert_eq!(FeedError::EmptyDataset.kind(), "empty");
    }

    #[test]
    fn parse_errors_convert() {
        let err = serde_json::from_str::<serde_json::Value>("{nope").err();
        let feed_err = err.map(FeedError::from);
        assert!(matches!(feed_err, Some(FeedError::Parse(_))));
    }
}
