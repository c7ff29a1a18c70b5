//! Per-worker in-memory key-value storage.
//!
//! Plain in-memory mapping — no persistence, no compaction, no secondary
//! indices — protected by a single per-process lock.

use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct WorkerStore {
    data: Mutex<HashMap<String, String>>,
}

impl WorkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: String, value: String) {
        self.data.lock().insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
