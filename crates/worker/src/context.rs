//! Shared per-process state handed to every HTTP handler and background
//! task in the worker binary.

use runtime_core::{ClusterConfig, WorkerId};

use crate::client::ControllerClient;
use crate::storage::WorkerStore;

pub struct WorkerContext {
    pub worker_id: WorkerId,
    pub self_url: String,
    pub store: WorkerStore,
    pub controller: ControllerClient,
    /// Used for worker-to-worker replicate calls; distinct from the
    /// controller client's own `reqwest::Client` only in intent, not
    /// configuration — both share the process-wide connection pool.
    pub http: reqwest::Client,
    pub config: ClusterConfig,
}

impl WorkerContext {
    pub fn new(
        worker_id: WorkerId,
        self_url: String,
        controller: ControllerClient,
        http: reqwest::Client,
        config: ClusterConfig,
    ) -> Self {
        Self {
            worker_id,
            self_url,
            store: WorkerStore::new(),
            controller,
            http,
            config,
        }
    }
}
