//! Worker replication engine: local write, controller re-query,
//! synchronous fan-out to peers, quorum counting.

use std::time::Duration;

use runtime_core::ReplicateRequest;
use tracing::warn;

use crate::context::WorkerContext;

const REPLICATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Executes `put(key, value)` on the contacted worker and returns the
/// number of copies written, including the local one.
pub async fn put(ctx: &WorkerContext, key: &str, value: &str) -> usize {
    ctx.store.put(key.to_string(), value.to_string());

    let replicas = match ctx.controller.query(key).await {
        Ok(response) => response.replicas,
        Err(e) => {
            warn!(key, error = %e, "could not contact controller for replica list");
            Vec::new()
        }
    };

    let peers: Vec<&String> = replicas.iter().filter(|url| url.as_str() != ctx.self_url).collect();

    let mut written = 1;
    for peer in peers {
        if replicate_to_peer(&ctx.http, peer, key, value).await {
            written += 1;
        }
    }
    written
}

/// Unconditional local write in response to a peer's `replicate` push.
/// There is no quorum logic on the receiving end.
pub fn accept_replicate(ctx: &WorkerContext, key: &str, value: &str) {
    ctx.store.put(key.to_string(), value.to_string());
}

async fn replicate_to_peer(http: &reqwest::Client, peer_url: &str, key: &str, value: &str) -> bool {
    let request = ReplicateRequest {
        key: Some(key.to_string()),
        value: Some(value.to_string()),
    };

    match http
        .post(format!("{}/replicate", peer_url))
        .json(&request)
        .timeout(REPLICATE_TIMEOUT)
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            warn!(peer_url, status = %response.status(), "peer rejected replicate");
            false
        }
        Err(e) => {
            warn!(peer_url, error = %e, "peer unreachable during replicate");
            false
        }
    }
}
