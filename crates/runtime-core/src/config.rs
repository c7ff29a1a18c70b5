//! Cluster-wide configuration constants

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Process-wide constants shared by the controller and every worker.
///
/// Loaded once at start-up from [`ClusterConfig::from_env`] and then passed
/// down by value; nothing here is mutated after start-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub controller_host: String,
    pub controller_port: u16,

    pub worker_base_port: u16,
    pub num_workers: usize,

    pub replication_factor: usize,
    pub sync_replicas: usize,

    #[serde(with = "secs_serde")]
    pub heartbeat_interval: Duration,
    #[serde(with = "secs_serde")]
    pub heartbeat_timeout: Duration,

    pub virtual_nodes: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            controller_host: "127.0.0.1".to_string(),
            controller_port: 5000,
            worker_base_port: 6000,
            num_workers: 4,
            replication_factor: 3,
            sync_replicas: 2,
            heartbeat_interval: Duration::from_secs(5),
            heartbeat_timeout: Duration::from_secs(15),
            virtual_nodes: 150,
        }
    }
}

impl ClusterConfig {
    /// Build a config from defaults, overriding individual fields from
    /// environment variables when present.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("CONTROLLER_HOST") {
            config.controller_host = v;
        }
        if let Some(v) = env_parsed::<u16>("CONTROLLER_PORT") {
            config.controller_port = v;
        }
        if let Some(v) = env_parsed::<u16>("WORKER_BASE_PORT") {
            config.worker_base_port = v;
        }
        if let Some(v) = env_parsed::<usize>("NUM_WORKERS") {
            config.num_workers = v;
        }
        if let Some(v) = env_parsed::<usize>("REPLICATION_FACTOR") {
            config.replication_factor = v;
        }
        if let Some(v) = env_parsed::<usize>("SYNC_REPLICAS") {
            config.sync_replicas = v;
        }
        if let Some(v) = env_parsed::<u64>("HEARTBEAT_INTERVAL_SECS") {
            config.heartbeat_interval = Duration::from_secs(v);
        }
        if let Some(v) = env_parsed::<u64>("HEARTBEAT_TIMEOUT_SECS") {
            config.heartbeat_timeout = Duration::from_secs(v);
        }
        if let Some(v) = env_parsed::<usize>("VIRTUAL_NODES") {
            config.virtual_nodes = v;
        }

        config
    }

    /// Controller base URL, e.g. `http://127.0.0.1:5000`.
    pub fn controller_url(&self) -> String {
        format!("http://{}:{}", self.controller_host, self.controller_port)
    }

    /// Enforces the stability constraints named in the configuration surface:
    /// `heartbeat_timeout >= 2 * heartbeat_interval` and
    /// `sync_replicas <= replication_factor`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.heartbeat_timeout < self.heartbeat_interval * 2 {
            return Err(Error::BadRequest {
                message: format!(
                    "heartbeat_timeout ({:?}) must be at least twice heartbeat_interval ({:?})",
                    self.heartbeat_timeout, self.heartbeat_interval
                ),
            });
        }
        if self.sync_replicas > self.replication_factor {
            return Err(Error::BadRequest {
                message: format!(
                    "sync_replicas ({}) cannot exceed replication_factor ({})",
                    self.sync_replicas, self.replication_factor
                ),
            });
        }
        if self.replication_factor == 0 {
            return Err(Error::BadRequest {
                message: "replication_factor must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Serializes a [`Duration`] as whole seconds.
mod secs_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
