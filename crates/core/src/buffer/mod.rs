//! Ingestion buffer module.
//!
//! Holds freshly fetched records until the persistence cycle drains them.

mod buffer_model;
mod ingestion_buffer;

pub use buffer_model::{DedupKey, DedupPolicy};
pub use ingestion_buffer::{Drain, IngestionBuffer};
