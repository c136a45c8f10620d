use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::vec;

use log::debug;
use shipwatch_feed::RawRecord;

use super::{DedupKey, DedupPolicy};
use crate::constants::BUFFER_UPDATE_SLICE;

/// Thread-safe, deduplicating holding area for fetched records.
///
/// Writers insert in bounded slices and the reader drains in chunks, so
/// neither side holds the lock for more than one slice or chunk at a time.
/// The first record buffered under a key wins; later ones are dropped until
/// the key is drained.
pub struct IngestionBuffer {
    policy: DedupPolicy,
    entries: Mutex<HashMap<DedupKey, RawRecord>>,
}

impl IngestionBuffer {
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Inserts every record whose key is not already buffered.
    ///
    /// Returns the number of records actually inserted.
    pub fn update<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut records = records.into_iter().peekable();
        let mut inserted = 0;

        while records.peek().is_some() {
            let mut entries = self.lock();
            for record in records.by_ref().take(BUFFER_UPDATE_SLICE) {
                if let Entry::Vacant(slot) = entries.entry(self.policy.key_for(&record)) {
                    slot.insert(record);
                    inserted += 1;
                }
            }
        }

        inserted
    }

    /// Lazily drains the buffer in chunks of at most `batch_size` records.
    ///
    /// The keys present when the drain starts are snapshotted and popped in
    /// order, so each chunk costs only its own size; records inserted
    /// meanwhile are left for the next drain.
    pub fn drain(&self, batch_size: usize) -> Drain<'_> {
        let keys: Vec<DedupKey> = self.lock().keys().copied().collect();
        debug!("Draining {} buffered records", keys.len());
        Drain {
            buffer: self,
            batch_size: batch_size.max(1),
            keys: keys.into_iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DedupKey, RawRecord>> {
        // Entries are plain data; a panicking writer cannot leave them torn.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes up to `limit` of `keys` from the map. Keys already gone are
    /// skipped.
    fn pop_chunk(&self, keys: &mut vec::IntoIter<DedupKey>, limit: usize) -> Vec<RawRecord> {
        let mut entries = self.lock();
        let mut chunk = Vec::with_capacity(limit.min(keys.len()));
        while chunk.len() < limit {
            let Some(key) = keys.next() else { break };
            if let Some(record) = entries.remove(&key) {
                chunk.push(record);
            }
        }
        chunk
    }
}

impl Default for IngestionBuffer {
    fn default() -> Self {
        Self::new(DedupPolicy::default())
    }
}

/// One-shot chunked drain of an [`IngestionBuffer`].
pub struct Drain<'a> {
    buffer: &'a IngestionBuffer,
    batch_size: usize,
    keys: vec::IntoIter<DedupKey>,
}

impl Iterator for Drain<'_> {
    type Item = Vec<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.keys.as_slice().is_empty() {
            return None;
        }

        let chunk = self.buffer.pop_chunk(&mut self.keys, self.batch_size);
        (!chunk.is_empty()).then_some(chunk)
    }
}
