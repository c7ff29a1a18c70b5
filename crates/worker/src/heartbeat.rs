//! Per-worker periodic liveness signal.
//!
//! Errors are logged and the loop continues; there is no backoff, since
//! heartbeat loss naturally causes the controller's failure detector to
//! act.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::context::WorkerContext;

pub async fn run(ctx: Arc<WorkerContext>, mut shutdown: broadcast::Receiver<()>) {
    let mut interval = tokio::time::interval(ctx.config.heartbeat_interval);
    interval.tick().await; // first tick fires immediately; skip it

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = ctx.controller.heartbeat(&ctx.worker_id).await {
                    warn!(worker_id = %ctx.worker_id, error = %e, "heartbeat failed");
                }
            }
            _ = shutdown.recv() => {
                info!(worker_id = %ctx.worker_id, "heartbeat task shutting down");
                break;
            }
        }
    }
}
