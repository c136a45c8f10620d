//! Error types for the feed crate.

use thiserror::Error;

/// Errors that can occur while fetching from a feed.
///
/// None of these are fatal to the ingester: the poller logs them and tries
/// again on its next tick. [`FeedError::NoData`] is kept separate from real
/// failures so callers can log it quietly.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The feed answered correctly but had nothing for this cycle.
    #[error("Feed returned no data")]
    NoData,

    /// The feed reported an error in its response header.
    #[error("Feed error: {provider} - {message}")]
    Provider {
        /// The provider that reported the error
        provider: String,
        /// The message sent by the provider
        message: String,
    },

    /// The response could not be decoded (bad gzip, bad JSON, wrong shape).
    #[error("Malformed response from {provider}: {message}")]
    Malformed {
        /// The provider that sent the response
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The request to the feed timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A network error occurred while talking to the feed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl FeedError {
    /// Returns true when the poller should treat the failure as an empty
    /// cycle and try again on its next tick.
    ///
    /// A bad response or an error reported by the feed says nothing about the
    /// next request, so every current variant is transient. New variants must
    /// be classified here.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NoData
            | Self::Provider { .. }
            | Self::Malformed { .. }
            | Self::Timeout { .. }
            | Self::Network(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_is_transient() {
        assert!(FeedError::NoData.is_transient());
        assert!(FeedError::Timeout {
            provider: "AISHUB".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_feed_reported_and_malformed_errors_are_transient() {
        assert!(FeedError::Malformed {
            provider: "AISHUB".to_string(),
            message: "not gzip".to_string(),
        }
        .is_transient());

        let err = FeedError::Provider {
            provider: "AISHUB".to_string(),
            message: "Too frequent requests".to_string(),
        };
        assert!(err.is_transient());
        assert_eq!(
            err.to_string(),
            "Feed error: AISHUB - Too frequent requests"
        );
    }
}
