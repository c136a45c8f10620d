//! SQLite storage implementation for Shipwatch.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `shipwatch-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations for the AIS tables
//! - The staging-table bulk loader and the ship geometry store
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!   core (buffer, services)
//!             │
//!             ▼
//!   storage-sqlite (this crate)
//!             │
//!             ▼
//!   temp.ais_staging ──merge──► ais_ship_infos
//!                          └──► ais_messages (history)
//! ```

pub mod ais;
pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

pub use ais::AisRepository;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use shipwatch_core::errors::{DatabaseError, Error, Result};
