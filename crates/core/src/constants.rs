use std::time::Duration;

/// Records inserted per buffer lock acquisition
pub const BUFFER_UPDATE_SLICE: usize = 1000;

/// Default number of records per drained chunk
pub const DEFAULT_DRAIN_BATCH_SIZE: usize = 10_000;

/// Feed poll interval (AISHub refuses requests more frequent than one per minute)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Persistence cycle interval
pub const DEFAULT_PERSIST_INTERVAL: Duration = Duration::from_secs(120);

/// Upper bound on the geometry service's wait between events
pub const DEFAULT_GEOMETRY_INTERVAL: Duration = Duration::from_secs(300);

/// Key prefix for cached observations
pub const CACHE_MESSAGE_PREFIX: &str = "message";
