//! Ingestion services.
//!
//! ```text
//! FeedPoller --update--> IngestionBuffer --drain--> PersistenceCycle --load--> store
//!                                                          |
//!                                                    StoreUpdated
//!                                                          v
//!                                                  GeometryRefresh
//! ```

mod feed_poller_service;
mod geometry_service;
mod persistence_service;

pub use feed_poller_service::FeedPollerService;
pub use geometry_service::GeometryRefreshService;
pub use persistence_service::PersistenceCycleService;
