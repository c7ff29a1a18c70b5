//! Assembles the controller's axum router.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::handlers::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/register", post(handlers::register))
        .route("/heartbeat", post(handlers::heartbeat))
        .route("/query", get(handlers::query))
        .route("/notify_put", post(handlers::notify_put))
        .route("/workers", get(handlers::workers))
        .route("/status", get(handlers::status))
        .layer(cors)
        .with_state(state)
}
