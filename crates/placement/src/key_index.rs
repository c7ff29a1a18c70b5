//! Per-worker key index: the controller's approximation of which keys a
//! worker is believed to hold, used only to drive recovery.

use std::collections::{HashMap, HashSet};

/// Maps worker id to the set of keys believed to live there.
///
/// Entries are never removed, even after a key is re-placed during
/// recovery — a worker's key set only ever grows. Like
/// [`placement::ConsistentHash`](crate::ConsistentHash), this type carries
/// no internal synchronization; it is meant to live behind the
/// controller's single global lock alongside the registry and the ring.
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    entries: HashMap<String, HashSet<String>>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty slot for `worker_id` if one does not already exist.
    /// Safe to call repeatedly (register is idempotent).
    pub fn ensure_worker(&mut self, worker_id: &str) {
        self.entries.entry(worker_id.to_string()).or_default();
    }

    /// Records that `key` is believed to live on `worker_id`. No-op if the
    /// worker has no slot — unknown ids are silently ignored.
    pub fn record(&mut self, worker_id: &str, key: &str) {
        if let Some(keys) = self.entries.get_mut(worker_id) {
            keys.insert(key.to_string());
        }
    }

    /// Keys believed to live on `worker_id`, snapshotted for recovery.
    pub fn keys_for(&self, worker_id: &str) -> Vec<String> {
        self.entries
            .get(worker_id)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }
}
