//! The controller's single global lock: registry + ring + key index,
//! mutated together, released before any outbound network call.

use chrono::Utc;
use parking_lot::RwLock;
use placement::{ConsistentHash, KeyIndex};
use runtime_core::{
    ClusterConfig, ControllerStatusResponse, Error, QueryResponse, Result, WorkerId,
    WorkerRecord, WorkersResponse,
};

use crate::registry::WorkerRegistry;

struct Inner {
    registry: WorkerRegistry,
    ring: ConsistentHash,
    key_index: KeyIndex,
}

/// Cluster metadata: membership, placement, and recovery bookkeeping.
///
/// Every public method here acquires the lock for the minimum interval
/// needed to read or mutate the three structures and returns before any
/// outbound HTTP happens — see `controller::rereplicator` and
/// `controller::handlers` for the network calls that follow.
pub struct ClusterState {
    inner: RwLock<Inner>,
    config: ClusterConfig,
}

impl ClusterState {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            inner: RwLock::new(Inner {
                registry: WorkerRegistry::new(config.heartbeat_timeout),
                ring: ConsistentHash::with_virtual_nodes(config.virtual_nodes),
                key_index: KeyIndex::new(),
            }),
            config,
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// `register(id, host, port)`: registry + ring + key-index updated
    /// atomically under the lock.
    pub fn register(&self, id: WorkerId, host: String, port: u16) -> WorkerRecord {
        let mut inner = self.inner.write();
        let record = inner.registry.register(id.clone(), host, port);
        inner.ring.add_worker(&id);
        inner.key_index.ensure_worker(&id);
        record
    }

    /// Records the heartbeat and, if it self-heals a previously-failed
    /// worker, puts it back on the placement ring.
    pub fn update_heartbeat(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write();
        inner.registry.update_heartbeat(id)?;
        inner.ring.add_worker(id);
        Ok(())
    }

    /// Resolves the current replica set for `key` and records each resolved
    /// id against the key index.
    pub fn query(&self, key: &str) -> Result<QueryResponse> {
        let mut inner = self.inner.write();

        let replica_ids = inner.ring.get_replicas(key, self.config.replication_factor);
        if replica_ids.is_empty() {
            return Err(Error::NoWorkers);
        }

        let mut resolved_ids = Vec::with_capacity(replica_ids.len());
        let mut resolved_urls = Vec::with_capacity(replica_ids.len());
        for id in &replica_ids {
            if let Some(url) = inner.registry.get_worker_url(id) {
                resolved_ids.push(id.clone());
                resolved_urls.push(url);
            }
        }

        for id in &resolved_ids {
            inner.key_index.record(id, key);
        }

        let primary_worker_id = resolved_ids
            .first()
            .cloned()
            .ok_or(Error::NoWorkers)?;
        let primary_worker = resolved_urls.first().cloned().ok_or(Error::NoWorkers)?;

        Ok(QueryResponse {
            success: true,
            key: key.to_string(),
            primary_worker,
            primary_worker_id,
            replicas: resolved_urls,
            replica_ids: resolved_ids,
        })
    }

    /// Records that `key` was written to each id in `replicas`. Idempotent;
    /// ids without a key-index slot are silently ignored.
    pub fn notify_put(&self, key: &str, replicas: &[WorkerId]) {
        let mut inner = self.inner.write();
        for id in replicas {
            inner.key_index.record(id, key);
        }
    }

    pub fn workers_snapshot(&self) -> WorkersResponse {
        let inner = self.inner.read();
        let workers: Vec<_> = inner
            .registry
            .all_workers()
            .iter()
            .map(Into::into)
            .collect();
        let active = inner.registry.active_count();
        let total = workers.len();
        WorkersResponse {
            success: true,
            workers,
            total,
            active,
        }
    }

    pub fn status(&self) -> ControllerStatusResponse {
        let inner = self.inner.read();
        ControllerStatusResponse {
            success: true,
            status: "running".to_string(),
            total_workers: inner.registry.total_count(),
            active_workers: inner.registry.active_count(),
            replication_factor: self.config.replication_factor,
            heartbeat_timeout: self.config.heartbeat_timeout.as_secs(),
        }
    }

    /// Sweeps for newly-failed workers. Called only by the failure detector.
    pub fn check_failed(&self) -> Vec<WorkerId> {
        self.inner.write().registry.check_failed(Utc::now())
    }

    /// Pulls `id` off the placement ring so future `query`s stop resolving
    /// keys onto it. Called by the re-replicator once it has finished
    /// recovering everything it believed lived on `id`.
    pub fn remove_from_ring(&self, id: &str) {
        self.inner.write().ring.remove_worker(id);
    }

    /// Snapshot of the target replica set for `key`, without touching the
    /// key index — used by the re-replicator to decide where a key should
    /// live without recording a placement for it.
    pub fn target_replicas(&self, key: &str) -> Vec<WorkerId> {
        self.inner
            .read()
            .ring
            .get_replicas(key, self.config.replication_factor)
    }

    pub fn active_ids(&self) -> Vec<WorkerId> {
        self.inner.read().registry.active_ids()
    }

    pub fn get_worker_url(&self, id: &str) -> Option<String> {
        self.inner.read().registry.get_worker_url(id)
    }

    /// Snapshot of the keys believed to live on `worker_id`. The
    /// re-replicator takes this snapshot under the lock before doing any
    /// network I/O.
    pub fn keys_for_worker(&self, worker_id: &str) -> Vec<String> {
        self.inner.read().key_index.keys_for(worker_id)
    }

    /// Records that `key` now lives on `worker_id` after a successful
    /// recovery replicate.
    pub fn record_key(&self, worker_id: &str, key: &str) {
        self.inner.write().key_index.record(worker_id, key);
    }
}
