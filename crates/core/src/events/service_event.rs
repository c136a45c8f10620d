//! Service event types.

use serde::{Deserialize, Serialize};

/// Events exchanged between supervised services.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceEvent {
    /// Ask the receiving service to exit its run loop.
    Stop,

    /// The persistence cycle committed new rows.
    StoreUpdated {
        new_history_rows: usize,
        new_latest_rows: usize,
    },

    /// The feed poller added records to the ingestion buffer.
    BufferUpdated {
        /// Entries waiting in the buffer after the update
        pending: usize,
    },
}

impl ServiceEvent {
    /// Creates a StoreUpdated event.
    pub fn store_updated(new_history_rows: usize, new_latest_rows: usize) -> Self {
        Self::StoreUpdated {
            new_history_rows,
            new_latest_rows,
        }
    }

    /// Creates a BufferUpdated event.
    pub fn buffer_updated(pending: usize) -> Self {
        Self::BufferUpdated { pending }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}
