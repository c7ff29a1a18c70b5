//! Binds the controller's HTTP listener and runs it alongside the failure
//! detector until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::failure_detector;
use crate::router;
use crate::state::ClusterState;

pub async fn run(state: Arc<ClusterState>, addr: SocketAddr) -> std::io::Result<()> {
    let http = reqwest::Client::new();
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let detector = tokio::spawn(failure_detector::run(state.clone(), http, shutdown_rx));

    let app = router::create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "controller listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(());
    let _ = detector.await;
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
