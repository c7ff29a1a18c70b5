//! Error taxonomy for the controller and worker processes

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Result type alias using the cluster [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type shared by the controller and worker HTTP surfaces.
///
/// `PeerUnreachable` deliberately has no variant here: network failures on
/// outbound replicate/probe calls are absorbed at the call site and counted,
/// never propagated as a client-visible error (see replication engine and
/// re-replicator).
#[derive(Error, Debug)]
pub enum Error {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("unknown worker: {worker_id}")]
    UnknownWorker { worker_id: String },

    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    #[error("no workers available")]
    NoWorkers,

    #[error("quorum not met: wrote {written}, needed {required}")]
    QuorumNotMet { written: usize, required: usize },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::UnknownWorker { .. } => StatusCode::NOT_FOUND,
            Error::KeyNotFound { .. } => StatusCode::NOT_FOUND,
            Error::NoWorkers => StatusCode::SERVICE_UNAVAILABLE,
            Error::QuorumNotMet { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Error::QuorumNotMet { written, .. } => json!({
                "success": false,
                "error": self.to_string(),
                "replicas_written": written,
            }),
            _ => json!({
                "success": false,
                "error": self.to_string(),
            }),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::BadRequest {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            Error::BadRequest { message: "x".into() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::UnknownWorker { worker_id: "w1".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::KeyNotFound { key: "k".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(Error::NoWorkers.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            Error::QuorumNotMet { written: 1, required: 2 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
