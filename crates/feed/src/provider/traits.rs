//! Feed provider trait definition.

use async_trait::async_trait;

use crate::errors::FeedError;
use crate::models::RawRecord;

/// Trait for AIS feed sources.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use shipwatch_feed::{FeedError, FeedProvider, RawRecord};
///
/// struct ReplayProvider {
///     records: Vec<RawRecord>,
/// }
///
/// #[async_trait]
/// impl FeedProvider for ReplayProvider {
///     fn id(&self) -> &'static str {
///         "REPLAY"
///     }
///
///     async fn fetch_latest(&self) -> Result<Vec<RawRecord>, FeedError> {
///         if self.records.is_empty() {
///             return Err(FeedError::NoData);
///         }
///         Ok(self.records.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Unique identifier for this provider, used in logs and errors.
    fn id(&self) -> &'static str;

    /// Fetch the latest observations.
    ///
    /// Records that fail validation are dropped by the provider; the returned
    /// vector only holds well-formed observations. An answer without any
    /// observation is reported as [`FeedError::NoData`].
    async fn fetch_latest(&self) -> Result<Vec<RawRecord>, FeedError>;
}
