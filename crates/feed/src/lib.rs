//! Shipwatch Feed Crate
//!
//! This crate fetches vessel telemetry from external AIS feeds and turns it
//! into normalized [`RawRecord`]s. It knows nothing about buffering or
//! storage; the core crate consumes the records it produces.
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |   AIS provider   | --> |  raw JSON rows   |  (transport + decoding)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  record parser   |  (per-row validation)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    RawRecord     |  (normalized observation)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`RawRecord`] - One normalized observation of a vessel
//! - [`Position`] - Position sub-record with an explicit validity flag
//! - [`StaticInfo`] - Static and voyage information, every field optional
//! - [`FeedProvider`] - Trait implemented by feed sources
//! - [`FeedError`] - Fetch failures, including the distinct "no data" outcome

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::FeedError;
pub use models::{ship_type, GeoPoint, Mmsi, Position, RawRecord, ShipType, StaticInfo};
pub use provider::aishub::{AisHubConfig, AisHubProvider};
pub use provider::FeedProvider;
