//! Consistent-hash placement ring: maps a key to an ordered replica set
//! drawn from the live workers currently on the ring.

use fnv::FnvHasher;
use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};

/// Default number of synthetic points placed per worker.
pub const DEFAULT_VIRTUAL_NODES: usize = 150;

/// The placement ring.
///
/// Mutated only by [`ConsistentHash::add_worker`] /
/// [`ConsistentHash::remove_worker`], both of which are meant to be called
/// under the controller's single global lock alongside the worker registry
/// and key index — this type carries no internal synchronization of its
/// own.
#[derive(Debug, Clone)]
pub struct ConsistentHash {
    ring: BTreeMap<u64, String>,
    virtual_nodes: usize,
}

impl ConsistentHash {
    pub fn new() -> Self {
        Self::with_virtual_nodes(DEFAULT_VIRTUAL_NODES)
    }

    pub fn with_virtual_nodes(virtual_nodes: usize) -> Self {
        Self {
            ring: BTreeMap::new(),
            virtual_nodes,
        }
    }

    fn hash<T: Hash + ?Sized>(key: &T) -> u64 {
        let mut hasher = FnvHasher::default();
        key.hash(&mut hasher);
        hasher.finish()
    }

    /// Places `virtual_nodes` synthetic points for `id` on the ring.
    /// On a hash collision the first insertion wins.
    pub fn add_worker(&mut self, id: &str) {
        for i in 0..self.virtual_nodes {
            let point = Self::hash(&format!("{}:vnode{}", id, i));
            self.ring.entry(point).or_insert_with(|| id.to_string());
        }
    }

    /// Removes every synthetic point belonging to `id`.
    pub fn remove_worker(&mut self, id: &str) {
        self.ring.retain(|_, owner| owner != id);
    }

    /// Returns up to `n` distinct worker ids for `key`, primary first,
    /// walking the ring clockwise from `hash(key)` with wraparound.
    pub fn get_replicas(&self, key: &str, n: usize) -> Vec<String> {
        if self.ring.is_empty() || n == 0 {
            return Vec::new();
        }

        let h = Self::hash(key);
        let mut seen = HashSet::new();
        let mut result = Vec::with_capacity(n);

        for (_, id) in self.ring.range(h..).chain(self.ring.range(..h)) {
            if seen.insert(id.clone()) {
                result.push(id.clone());
                if result.len() == n {
                    break;
                }
            }
        }

        result
    }

    pub fn contains_worker(&self, id: &str) -> bool {
        self.ring.values().any(|owner| owner == id)
    }

    /// Number of distinct workers currently on the ring.
    pub fn worker_count(&self) -> usize {
        self.ring
            .values()
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of positions currently occupied by `id`.
    pub fn points_for_worker(&self, id: &str) -> usize {
        self.ring.values().filter(|owner| owner.as_str() == id).count()
    }
}

impl Default for ConsistentHash {
    fn default() -> Self {
        Self::new()
    }
}
