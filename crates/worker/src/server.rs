//! Binds the worker's HTTP listener and runs it alongside the heartbeat
//! task until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::context::WorkerContext;
use crate::heartbeat;
use crate::router;

pub async fn run(ctx: Arc<WorkerContext>, addr: SocketAddr) -> std::io::Result<()> {
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let heartbeat_task = tokio::spawn(heartbeat::run(ctx.clone(), shutdown_rx));

    let app = router::create_router(ctx);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "worker listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(());
    let _ = heartbeat_task.await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
