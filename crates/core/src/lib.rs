//! Shipwatch Core - ingestion buffer, batch materializer and service orchestration.
//!
//! This crate contains the ingestion logic of the AIS ingester. It is
//! database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate.

pub mod ais;
pub mod buffer;
pub mod cache;
pub mod constants;
pub mod errors;
pub mod events;
pub mod ingest;
pub mod service;
pub mod staging;

// Re-export the types most callers need
pub use buffer::{DedupPolicy, IngestionBuffer};
pub use events::{EventBus, EventSink, ServiceEvent};
pub use service::{Service, ServiceState, Supervisor, Wakeup};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
