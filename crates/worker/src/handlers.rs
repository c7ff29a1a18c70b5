//! HTTP handlers for the worker's external interface.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use runtime_core::{
    Error, GetResponse, PutRequest, PutResponse, ReplicateRequest, ReplicateResponse, Result,
    WorkerStatusResponse,
};

use crate::context::WorkerContext;
use crate::replication;

pub type AppState = Arc<WorkerContext>;

pub async fn get(
    State(ctx): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let key = params.get("key").cloned().ok_or_else(|| Error::BadRequest {
        message: "missing key parameter".to_string(),
    })?;

    match ctx.store.get(&key) {
        Some(value) => Ok(Json(GetResponse {
            success: true,
            key,
            value,
        })),
        None => Err(Error::KeyNotFound { key }),
    }
}

pub async fn put(
    State(ctx): State<AppState>,
    Json(body): Json<PutRequest>,
) -> Result<impl IntoResponse> {
    let key = body.key.ok_or_else(|| Error::BadRequest {
        message: "missing key or value".to_string(),
    })?;
    let value = body.value.ok_or_else(|| Error::BadRequest {
        message: "missing key or value".to_string(),
    })?;

    let written = replication::put(&ctx, &key, &value).await;
    let required = ctx.config.sync_replicas;

    if written >= required {
        Ok((
            StatusCode::OK,
            Json(PutResponse {
                success: true,
                key,
                replicas_written: written,
            }),
        ))
    } else {
        Err(Error::QuorumNotMet {
            written,
            required,
        })
    }
}

pub async fn replicate(
    State(ctx): State<AppState>,
    Json(body): Json<ReplicateRequest>,
) -> Result<impl IntoResponse> {
    let key = body.key.ok_or_else(|| Error::BadRequest {
        message: "missing key or value".to_string(),
    })?;
    let value = body.value.ok_or_else(|| Error::BadRequest {
        message: "missing key or value".to_string(),
    })?;

    replication::accept_replicate(&ctx, &key, &value);

    Ok(Json(ReplicateResponse {
        success: true,
        message: "replication successful".to_string(),
    }))
}

pub async fn status(State(ctx): State<AppState>) -> impl IntoResponse {
    Json(WorkerStatusResponse {
        success: true,
        worker_id: ctx.worker_id.clone(),
        status: "active".to_string(),
        num_keys: ctx.store.len(),
    })
}
