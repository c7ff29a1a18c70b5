//! HTTP handlers for the controller's external interface.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use runtime_core::{
    Error, HeartbeatRequest, HeartbeatResponse, NotifyPutRequest, NotifyPutResponse,
    RegisterRequest, RegisterResponse, Result,
};
use tracing::debug;

use crate::state::ClusterState;
use crate::validate::validate_worker_id;

pub type AppState = Arc<ClusterState>;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let worker_id = body.worker_id.ok_or_else(|| Error::BadRequest {
        message: "missing required fields: worker_id, host, port".to_string(),
    })?;
    let host = body.host.ok_or_else(|| Error::BadRequest {
        message: "missing required fields: worker_id, host, port".to_string(),
    })?;
    let port = body.port.ok_or_else(|| Error::BadRequest {
        message: "missing required fields: worker_id, host, port".to_string(),
    })?;
    validate_worker_id(&worker_id)?;

    let record = state.register(worker_id.clone(), host, port);
    debug!(worker_id = %record.id, "handled /register");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            worker_id: record.id,
        }),
    ))
}

pub async fn heartbeat(
    State(state): State<AppState>,
    Json(body): Json<HeartbeatRequest>,
) -> Result<impl IntoResponse> {
    let worker_id = body.worker_id.ok_or_else(|| Error::BadRequest {
        message: "missing worker_id".to_string(),
    })?;

    state.update_heartbeat(&worker_id)?;
    debug!(worker_id = %worker_id, "handled /heartbeat");

    Ok(Json(HeartbeatResponse {
        success: true,
        message: "heartbeat received".to_string(),
    }))
}

pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let key = params.get("key").cloned().ok_or_else(|| Error::BadRequest {
        message: "missing key parameter".to_string(),
    })?;

    let response = state.query(&key)?;
    Ok(Json(response))
}

pub async fn notify_put(
    State(state): State<AppState>,
    Json(body): Json<NotifyPutRequest>,
) -> Result<impl IntoResponse> {
    let worker_id = body.worker_id.ok_or_else(|| Error::BadRequest {
        message: "missing required fields".to_string(),
    })?;
    let key = body.key.ok_or_else(|| Error::BadRequest {
        message: "missing required fields".to_string(),
    })?;
    let _ = worker_id; // the notifying worker is informational only; all named replicas are updated

    state.notify_put(&key, &body.replicas);

    Ok(Json(NotifyPutResponse {
        success: true,
        message: "key tracking updated".to_string(),
    }))
}

pub async fn workers(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.workers_snapshot())
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.status())
}
