//! Feed provider abstractions and implementations.
//!
//! Providers own their transport and wire format. They hand back normalized
//! records and report "nothing this cycle" as [`FeedError::NoData`] rather
//! than as an empty success, so the poller can tell quiet feeds from broken
//! ones.
//!
//! [`FeedError::NoData`]: crate::FeedError::NoData

mod traits;

pub mod aishub;

pub use traits::FeedProvider;
