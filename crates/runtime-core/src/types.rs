//! Shared identifiers and wire types for the controller/worker HTTP surfaces

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique worker identifier, chosen by the operator at launch time.
pub type WorkerId = String;

/// Liveness state of a registered worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Active,
    Failed,
}

/// Everything the controller knows about one worker.
///
/// Created on first `register`, updated by heartbeats and by the failure
/// detector, and never removed from the registry in-process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub id: WorkerId,
    pub host: String,
    pub port: u16,
    pub status: WorkerStatus,
    pub last_heartbeat: DateTime<Utc>,
    pub registered_at: DateTime<Utc>,
    pub failed_at: Option<DateTime<Utc>>,
}

impl WorkerRecord {
    pub fn new(id: WorkerId, host: String, port: u16) -> Self {
        let now = Utc::now();
        Self {
            id,
            host,
            port,
            status: WorkerStatus::Active,
            last_heartbeat: now,
            registered_at: now,
            failed_at: None,
        }
    }

    /// Derived HTTP base URL, e.g. `http://localhost:6000`.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

// ---- controller wire types --------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub worker_id: Option<WorkerId>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub worker_id: WorkerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub worker_id: Option<WorkerId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    pub key: String,
    pub primary_worker: String,
    pub primary_worker_id: WorkerId,
    pub replicas: Vec<String>,
    pub replica_ids: Vec<WorkerId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyPutRequest {
    pub worker_id: Option<WorkerId>,
    pub key: Option<String>,
    #[serde(default)]
    pub replicas: Vec<WorkerId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotifyPutResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerSummary {
    pub id: WorkerId,
    pub host: String,
    pub port: u16,
    pub url: String,
    pub status: WorkerStatus,
}

impl From<&WorkerRecord> for WorkerSummary {
    fn from(record: &WorkerRecord) -> Self {
        Self {
            id: record.id.clone(),
            host: record.host.clone(),
            port: record.port,
            url: record.url(),
            status: record.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkersResponse {
    pub success: bool,
    pub workers: Vec<WorkerSummary>,
    pub total: usize,
    pub active: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerStatusResponse {
    pub success: bool,
    pub status: String,
    pub total_workers: usize,
    pub active_workers: usize,
    pub replication_factor: usize,
    pub heartbeat_timeout: u64,
}

// ---- worker wire types --------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    pub success: bool,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PutRequest {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PutResponse {
    pub success: bool,
    pub key: String,
    pub replicas_written: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplicateRequest {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplicateResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatusResponse {
    pub success: bool,
    pub worker_id: WorkerId,
    pub status: String,
    pub num_keys: usize,
}
