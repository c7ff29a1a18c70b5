use std::net::SocketAddr;
use std::sync::Arc;

use controller::ClusterState;
use runtime_core::ClusterConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "controller=info,placement=info,runtime_core=info".into()
        }))
        .with(fmt::layer())
        .init();

    let config = ClusterConfig::from_env();
    if let Err(e) = config.validate() {
        eprintln!("invalid configuration: {e}");
        std::process::exit(1);
    }

    let addr: SocketAddr = format!("{}:{}", config.controller_host, config.controller_port)
        .parse()
        .expect("invalid controller bind address");

    tracing::info!(
        %addr,
        replication_factor = config.replication_factor,
        sync_replicas = config.sync_replicas,
        expected_workers = config.num_workers,
        heartbeat_timeout_secs = config.heartbeat_timeout.as_secs(),
        "starting distributed kv store controller"
    );

    let state = Arc::new(ClusterState::new(config));

    if let Err(e) = controller::server::run(state, addr).await {
        tracing::error!(error = %e, "controller server exited with an error");
        std::process::exit(1);
    }
}
