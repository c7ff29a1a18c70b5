//! Assembles the worker's axum router.

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
        .route("/get", get(handlers::get))
        .route("/put", post(handlers::put))
        .route("/replicate", post(handlers::replicate))
        .route("/status", get(handlers::status))
        .layer(cors)
        .with_state(state)
}
