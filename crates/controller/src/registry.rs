//! Worker registry: identity, address, liveness state, and last-heartbeat
//! time for every worker that has ever registered.

use chrono::{DateTime, Utc};
use runtime_core::{Error, Result, WorkerId, WorkerRecord, WorkerStatus};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Tracks every worker that has ever registered.
///
/// Carries no internal synchronization — it is meant to live behind the
/// controller's single global lock alongside the placement ring and the
/// key index, not behind its own fine-grained lock.
pub struct WorkerRegistry {
    workers: HashMap<WorkerId, WorkerRecord>,
    /// Registration order, used to make `active_ids()` stable across a
    /// single recovery pass.
    order: Vec<WorkerId>,
    heartbeat_timeout: Duration,
}

impl WorkerRegistry {
    pub fn new(heartbeat_timeout: Duration) -> Self {
        Self {
            workers: HashMap::new(),
            order: Vec::new(),
            heartbeat_timeout,
        }
    }

    /// Idempotent over `(id, host, port)`: a second call with the same id
    /// overwrites host/port, resets the heartbeat, and clears any prior
    /// failure — a worker that crashed and restarts comes back active
    /// immediately rather than waiting for its next heartbeat to land.
    pub fn register(&mut self, id: WorkerId, host: String, port: u16) -> WorkerRecord {
        if let Some(existing) = self.workers.get_mut(&id) {
            existing.host = host;
            existing.port = port;
            existing.last_heartbeat = Utc::now();
            existing.status = WorkerStatus::Active;
            existing.failed_at = None;
            info!(worker_id = %id, "worker re-registered");
            return existing.clone();
        }

        let record = WorkerRecord::new(id.clone(), host, port);
        self.order.push(id.clone());
        self.workers.insert(id.clone(), record.clone());
        info!(worker_id = %id, url = %record.url(), "worker registered");
        record
    }

    /// Sets `last_heartbeat = now`, self-healing a `failed` worker back to
    /// `active`. Fails with [`Error::UnknownWorker`] if `id` was never
    /// registered.
    pub fn update_heartbeat(&mut self, id: &str) -> Result<()> {
        let record = self
            .workers
            .get_mut(id)
            .ok_or_else(|| Error::UnknownWorker {
                worker_id: id.to_string(),
            })?;

        record.last_heartbeat = Utc::now();
        if record.status == WorkerStatus::Failed {
            record.status = WorkerStatus::Active;
            record.failed_at = None;
            info!(worker_id = %id, "worker self-healed after heartbeat");
        }
        Ok(())
    }

    /// Flips every `active` worker whose last heartbeat is older than the
    /// configured timeout to `failed`, records `failed_at`, and returns the
    /// newly-failed ids. Already-failed workers are not re-reported.
    pub fn check_failed(&mut self, now: DateTime<Utc>) -> Vec<WorkerId> {
        let mut newly_failed = Vec::new();

        for record in self.workers.values_mut() {
            if record.status != WorkerStatus::Active {
                continue;
            }
            let elapsed = now.signed_duration_since(record.last_heartbeat);
            let elapsed = elapsed.to_std().unwrap_or(Duration::MAX);
            if elapsed > self.heartbeat_timeout {
                record.status = WorkerStatus::Failed;
                record.failed_at = Some(now);
                warn!(worker_id = %record.id, ?elapsed, "worker declared failed");
                newly_failed.push(record.id.clone());
            }
        }

        newly_failed
    }

    pub fn get(&self, id: &str) -> Option<&WorkerRecord> {
        self.workers.get(id)
    }

    pub fn get_worker_url(&self, id: &str) -> Option<String> {
        self.workers.get(id).map(WorkerRecord::url)
    }

    /// Active worker ids, in registration order.
    pub fn active_ids(&self) -> Vec<WorkerId> {
        self.order
            .iter()
            .filter(|id| {
                self.workers
                    .get(*id)
                    .map(|w| w.status == WorkerStatus::Active)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    pub fn all_workers(&self) -> Vec<WorkerRecord> {
        self.order
            .iter()
            .filter_map(|id| self.workers.get(id).cloned())
            .collect()
    }

    pub fn total_count(&self) -> usize {
        self.workers.len()
    }

    pub fn active_count(&self) -> usize {
        self.workers
            .values()
            .filter(|w| w.status == WorkerStatus::Active)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> WorkerRegistry {
        WorkerRegistry::new(Duration::from_secs(15))
    }

    #[test]
    fn register_is_idempotent() {
        let mut reg = registry();
        reg.register("w1".into(), "localhost".into(), 6000);
        reg.register("w1".into(), "localhost".into(), 6001);

        assert_eq!(reg.total_count(), 1);
        assert_eq!(reg.get("w1").unwrap().port, 6001);
    }

    #[test]
    fn unknown_worker_heartbeat_fails() {
        let mut reg = registry();
        let err = reg.update_heartbeat("ghost").unwrap_err();
        assert!(matches!(err, Error::UnknownWorker { .. }));
    }

    #[test]
    fn check_failed_flips_status_and_reports_once() {
        let mut reg = registry();
        reg.register("w1".into(), "localhost".into(), 6000);

        let past = Utc::now() + chrono::Duration::seconds(20);
        let failed = reg.check_failed(past);
        assert_eq!(failed, vec!["w1".to_string()]);
        assert_eq!(reg.get("w1").unwrap().status, WorkerStatus::Failed);

        // a second sweep should not re-report the same worker
        let failed_again = reg.check_failed(past + chrono::Duration::seconds(5));
        assert!(failed_again.is_empty());
    }

    #[test]
    fn heartbeat_self_heals_a_failed_worker() {
        let mut reg = registry();
        reg.register("w1".into(), "localhost".into(), 6000);
        let past = Utc::now() + chrono::Duration::seconds(20);
        reg.check_failed(past);
        assert_eq!(reg.get("w1").unwrap().status, WorkerStatus::Failed);

        reg.update_heartbeat("w1").unwrap();
        assert_eq!(reg.get("w1").unwrap().status, WorkerStatus::Active);
        assert!(reg.get("w1").unwrap().failed_at.is_none());
    }

    #[test]
    fn active_ids_preserve_registration_order() {
        let mut reg = registry();
        reg.register("w3".into(), "h".into(), 1);
        reg.register("w1".into(), "h".into(), 2);
        reg.register("w2".into(), "h".into(), 3);

        assert_eq!(reg.active_ids(), vec!["w3", "w1", "w2"]);
    }
}
