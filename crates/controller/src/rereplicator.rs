//! Per-failure recovery task.
//!
//! Runs independently of the failure detector and never holds the cluster
//! lock across outbound I/O — each probe or push is a single bounded HTTP
//! call, with network failure absorbed as `None`/`false` rather than
//! propagated as an error.

use std::sync::Arc;
use std::time::Duration;

use runtime_core::{GetResponse, ReplicateRequest, WorkerId};
use tracing::{info, warn};

use crate::state::ClusterState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Restores the replication factor for every key believed to have lived on
/// `failed_worker_id`, snapshotted from the key index before this task
/// started.
pub async fn recover(state: Arc<ClusterState>, http: reqwest::Client, failed_worker_id: WorkerId) {
    info!(worker_id = %failed_worker_id, "starting re-replication");

    let keys = state.keys_for_worker(&failed_worker_id);

    let mut recovered = 0usize;
    let mut unrecoverable = 0usize;

    for key in keys {
        if recover_key(&state, &http, &failed_worker_id, &key).await {
            recovered += 1;
        } else {
            unrecoverable += 1;
        }
    }

    // Only now, with every key either healed or given up on, does the ring
    // stop handing out new placements onto the failed worker.
    state.remove_from_ring(&failed_worker_id);

    info!(
        worker_id = %failed_worker_id,
        recovered,
        unrecoverable,
        "re-replication complete"
    );
}

async fn recover_key(
    state: &Arc<ClusterState>,
    http: &reqwest::Client,
    failed_worker_id: &str,
    key: &str,
) -> bool {
    let target = state.target_replicas(key);
    let surviving: Vec<&WorkerId> = target.iter().filter(|id| id.as_str() != failed_worker_id).collect();

    let mut source_value = None;
    for id in &surviving {
        if let Some(url) = state.get_worker_url(id) {
            if let Some(value) = probe_get(http, &url, key).await {
                source_value = Some(value);
                break;
            }
        }
    }

    let Some(value) = source_value else {
        warn!(key, "no surviving copy found; data is lost for this key");
        return false;
    };

    let mut current_replicas = 0usize;
    for id in &surviving {
        if let Some(url) = state.get_worker_url(id) {
            if probe_get(http, &url, key).await.is_some() {
                current_replicas += 1;
            }
        }
    }

    let required = state.config().replication_factor.saturating_sub(1);
    if current_replicas >= required {
        return true;
    }

    let active = state.active_ids();
    let Some(new_home) = active.into_iter().find(|id| !target.contains(id)) else {
        warn!(key, "no available worker to host a new replica");
        return false;
    };

    let Some(url) = state.get_worker_url(&new_home) else {
        return false;
    };

    if replicate(http, &url, key, &value).await {
        state.record_key(&new_home, key);
        info!(key, new_home = %new_home, "re-replicated");
        true
    } else {
        warn!(key, new_home = %new_home, "re-replicate push failed");
        false
    }
}

async fn probe_get(http: &reqwest::Client, worker_url: &str, key: &str) -> Option<String> {
    let response = http
        .get(format!("{}/get", worker_url))
        .query(&[("key", key)])
        .timeout(PROBE_TIMEOUT)
        .send()
        .await
        .ok()?;

    if !response.status().is_success() {
        return None;
    }
    response.json::<GetResponse>().await.ok().map(|r| r.value)
}

async fn replicate(http: &reqwest::Client, worker_url: &str, key: &str, value: &str) -> bool {
    let request = ReplicateRequest {
        key: Some(key.to_string()),
        value: Some(value.to_string()),
    };

    match http
        .post(format!("{}/replicate", worker_url))
        .json(&request)
        .timeout(PROBE_TIMEOUT)
        .send()
        .await
    {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}
