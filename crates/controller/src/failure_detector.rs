//! Cooperative failure-detection sweep.
//!
//! Wakes every `HeartbeatInterval`, calls `check_failed`, and spawns an
//! independent recovery task per newly-failed worker without blocking on
//! recovery — the pattern mirrors a periodic dead-worker sweep running
//! alongside request traffic rather than stealing its thread.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::rereplicator;
use crate::state::ClusterState;

pub async fn run(
    state: Arc<ClusterState>,
    http: reqwest::Client,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(state.config().heartbeat_interval);
    interval.tick().await; // first tick fires immediately; skip it

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let newly_failed = state.check_failed();
                for worker_id in newly_failed {
                    let state = state.clone();
                    let http = http.clone();
                    tokio::spawn(async move {
                        rereplicator::recover(state, http, worker_id).await;
                    });
                }
            }
            _ = shutdown.recv() => {
                info!("failure detector shutting down");
                break;
            }
        }
    }
}
