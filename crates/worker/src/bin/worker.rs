use std::net::SocketAddr;
use std::sync::Arc;

use runtime_core::ClusterConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use worker::client::ControllerClient;
use worker::context::WorkerContext;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "worker=info,runtime_core=info".into()),
        )
        .with(fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: worker <id> <port>");
        std::process::exit(1);
    }
    let worker_id = args[1].clone();
    let port: u16 = match args[2].parse() {
        Ok(p) => p,
        Err(_) => {
            eprintln!("invalid port: {}", args[2]);
            std::process::exit(1);
        }
    };

    let config = ClusterConfig::from_env();
    if let Err(e) = config.validate() {
        eprintln!("invalid configuration: {e}");
        std::process::exit(1);
    }

    let host = "localhost";
    let self_url = format!("http://{host}:{port}");
    let http = reqwest::Client::new();
    let controller = ControllerClient::new(http.clone(), config.controller_url());

    tracing::info!(
        worker_id = %worker_id,
        %self_url,
        controller_url = %config.controller_url(),
        "registering with controller"
    );

    if let Err(e) = controller.register(&worker_id, host, port).await {
        tracing::error!(error = %e, "registration failed");
        std::process::exit(1);
    }

    let addr: SocketAddr = format!("0.0.0.0:{port}")
        .parse()
        .expect("invalid worker bind address");

    let ctx = Arc::new(WorkerContext::new(
        worker_id,
        self_url,
        controller,
        http,
        config,
    ));

    if let Err(e) = worker::server::run(ctx, addr).await {
        tracing::error!(error = %e, "worker server exited with an error");
        std::process::exit(1);
    }
}
