//! Outbound HTTP client the worker uses to talk to the controller.

use std::time::Duration;

use runtime_core::{
    Error, HeartbeatRequest, QueryResponse, RegisterRequest, RegisterResponse, Result,
};

const REGISTER_TIMEOUT: Duration = Duration::from_secs(5);
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);
const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct ControllerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ControllerClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    pub async fn register(&self, worker_id: &str, host: &str, port: u16) -> Result<()> {
        let request = RegisterRequest {
            worker_id: Some(worker_id.to_string()),
            host: Some(host.to_string()),
            port: Some(port),
        };

        let response = self
            .http
            .post(format!("{}/register", self.base_url))
            .json(&request)
            .timeout(REGISTER_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Internal {
                message: format!("registration request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(Error::Internal {
                message: format!("controller rejected registration: {}", response.status()),
            });
        }

        let _: RegisterResponse = response.json().await.map_err(|e| Error::Internal {
            message: format!("malformed registration response: {e}"),
        })?;
        Ok(())
    }

    /// Sends a single heartbeat. Errors are the caller's to log and ignore —
    /// the heartbeat loop keeps running regardless.
    pub async fn heartbeat(&self, worker_id: &str) -> std::result::Result<(), String> {
        let request = HeartbeatRequest {
            worker_id: Some(worker_id.to_string()),
        };

        let response = self
            .http
            .post(format!("{}/heartbeat", self.base_url))
            .json(&request)
            .timeout(HEARTBEAT_TIMEOUT)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("heartbeat rejected: {}", response.status()))
        }
    }

    /// Current replica set for `key`, fetched fresh on every call.
    pub async fn query(&self, key: &str) -> Result<QueryResponse> {
        let response = self
            .http
            .get(format!("{}/query", self.base_url))
            .query(&[("key", key)])
            .timeout(QUERY_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::Internal {
                message: format!("query request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(Error::NoWorkers);
        }

        response.json().await.map_err(|e| Error::Internal {
            message: format!("malformed query response: {e}"),
        })
    }
}
