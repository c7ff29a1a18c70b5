//! End-to-end tests driving real controller and worker HTTP servers over
//! loopback sockets.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use controller::ClusterState;
use runtime_core::ClusterConfig;
use tokio::time::sleep;
use worker::client::ControllerClient;
use worker::context::WorkerContext;

struct Cluster {
    controller_url: String,
    worker_ids: Vec<String>,
    worker_urls: Vec<String>,
    worker_handles: Vec<tokio::task::JoinHandle<()>>,
    config: ClusterConfig,
    http: reqwest::Client,
}

async fn spawn_controller(config: ClusterConfig) -> Result<String> {
    let port = portpicker::pick_unused_port().expect("no ports free");
    let mut config = config;
    config.controller_host = "127.0.0.1".to_string();
    config.controller_port = port;
    let addr = SocketAddr::from_str(&format!("127.0.0.1:{port}"))?;

    let state = Arc::new(ClusterState::new(config));
    tokio::spawn(async move {
        controller::server::run(state, addr).await.ok();
    });

    sleep(Duration::from_millis(150)).await;
    Ok(format!("http://127.0.0.1:{port}"))
}

async fn spawn_worker(
    worker_id: &str,
    controller_url: &str,
    config: ClusterConfig,
) -> Result<(String, tokio::task::JoinHandle<()>)> {
    let port = portpicker::pick_unused_port().expect("no ports free");
    let addr = SocketAddr::from_str(&format!("127.0.0.1:{port}"))?;
    let self_url = format!("http://127.0.0.1:{port}");

    let http = reqwest::Client::new();
    let controller = ControllerClient::new(http.clone(), controller_url.to_string());
    controller.register(worker_id, "127.0.0.1", port).await?;

    let ctx = Arc::new(WorkerContext::new(
        worker_id.to_string(),
        self_url.clone(),
        controller,
        http,
        config,
    ));

    let handle = tokio::spawn(async move {
        worker::server::run(ctx, addr).await.ok();
    });

    sleep(Duration::from_millis(150)).await;
    Ok((self_url, handle))
}

async fn start_cluster(
    num_workers: usize,
    replication_factor: usize,
    sync_replicas: usize,
) -> Result<Cluster> {
    let config = ClusterConfig {
        replication_factor,
        sync_replicas,
        heartbeat_interval: Duration::from_millis(200),
        heartbeat_timeout: Duration::from_millis(600),
        ..ClusterConfig::default()
    };

    let controller_url = spawn_controller(config.clone()).await?;

    let mut worker_ids = Vec::new();
    let mut worker_urls = Vec::new();
    let mut worker_handles = Vec::new();
    for i in 0..num_workers {
        let id = format!("w{i}");
        let (url, handle) = spawn_worker(&id, &controller_url, config.clone()).await?;
        worker_ids.push(id);
        worker_urls.push(url);
        worker_handles.push(handle);
    }

    Ok(Cluster {
        controller_url,
        worker_ids,
        worker_urls,
        worker_handles,
        config,
        http: reqwest::Client::new(),
    })
}

impl Cluster {
    async fn put(&self, worker_url: &str, key: &str, value: &str) -> reqwest::Response {
        self.http
            .post(format!("{worker_url}/put"))
            .json(&serde_json::json!({"key": key, "value": value}))
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, worker_url: &str, key: &str) -> reqwest::Response {
        self.http
            .get(format!("{worker_url}/get"))
            .query(&[("key", key)])
            .send()
            .await
            .unwrap()
    }

    async fn query(&self, key: &str) -> serde_json::Value {
        self.http
            .get(format!("{}/query", self.controller_url))
            .query(&[("key", key)])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn workers(&self) -> serde_json::Value {
        self.http
            .get(format!("{}/workers", self.controller_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// Simulates a crash: aborts the worker's server task (and with it its
    /// heartbeat loop) so the controller's failure detector eventually
    /// declares it dead.
    fn kill_worker(&self, worker_id: &str) {
        let index = self
            .worker_ids
            .iter()
            .position(|id| id == worker_id)
            .expect("unknown worker id");
        self.worker_handles[index].abort();
    }
}

#[tokio::test]
async fn basic_round_trip() -> Result<()> {
    let cluster = start_cluster(4, 3, 2).await?;

    let resp = cluster.put(&cluster.worker_urls[0], "hello", "world").await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await?;
    assert!(body["replicas_written"].as_u64().unwrap() >= 2);

    let resp = cluster.get(&cluster.worker_urls[0], "hello").await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["value"], "world");

    Ok(())
}

#[tokio::test]
async fn keys_distribute_across_distinct_primaries() -> Result<()> {
    let cluster = start_cluster(4, 3, 2).await?;

    let mut primaries = HashSet::new();
    for i in 0..20 {
        let key = format!("key-{i}");
        let query = cluster.query(&key).await;
        primaries.insert(query["primary_worker_id"].as_str().unwrap().to_string());
    }

    assert!(
        primaries.len() >= 2,
        "expected keys spread across multiple primaries, got {primaries:?}"
    );
    Ok(())
}

#[tokio::test]
async fn missing_key_returns_404() -> Result<()> {
    let cluster = start_cluster(4, 3, 2).await?;
    let resp = cluster.get(&cluster.worker_urls[0], "does-not-exist").await;
    assert_eq!(resp.status(), 404);
    Ok(())
}

#[tokio::test]
async fn quorum_boundary_counts_only_reachable_replicas() -> Result<()> {
    let cluster = start_cluster(4, 3, 2).await?;

    let query = cluster.query("boundary-key").await;
    let primary_url = query["primary_worker"].as_str().unwrap();

    let resp = cluster.put(primary_url, "boundary-key", "v").await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await?;
    assert!(body["replicas_written"].as_u64().unwrap() >= 2);

    Ok(())
}

#[tokio::test]
async fn steady_state_reports_all_workers_active() -> Result<()> {
    let cluster = start_cluster(4, 3, 2).await?;

    sleep(Duration::from_millis(300)).await;
    let workers = cluster.workers().await;
    assert_eq!(workers["active"].as_u64().unwrap(), 4);
    assert_eq!(workers["total"].as_u64().unwrap(), 4);

    Ok(())
}

#[tokio::test]
async fn worker_that_stops_heartbeating_is_marked_failed() -> Result<()> {
    let cluster = start_cluster(3, 3, 2).await?;

    // Register a phantom worker directly, bypassing the heartbeat task a
    // real worker process would run, so it never heartbeats again.
    cluster
        .http
        .post(format!("{}/register", cluster.controller_url))
        .json(&serde_json::json!({"worker_id": "ghost", "host": "127.0.0.1", "port": 1}))
        .send()
        .await?;

    sleep(Duration::from_millis(900)).await;

    let workers = cluster.workers().await;
    assert_eq!(workers["total"].as_u64().unwrap(), 4);
    assert_eq!(workers["active"].as_u64().unwrap(), 3);

    Ok(())
}

#[tokio::test]
async fn killed_replica_is_recovered_onto_a_surviving_worker() -> Result<()> {
    let cluster = start_cluster(4, 3, 2).await?;

    let key = "recoverable-key";
    let query = cluster.query(key).await;
    let primary_url = query["primary_worker"].as_str().unwrap();

    let resp = cluster.put(primary_url, key, "v").await;
    assert_eq!(resp.status(), 200);

    // pick a non-primary replica to kill so the write path above isn't
    // disturbed by the crash.
    let replica_ids: Vec<String> = query["replica_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap().to_string())
        .collect();
    let primary_id = query["primary_worker_id"].as_str().unwrap().to_string();
    let victim = replica_ids
        .iter()
        .find(|id| **id != primary_id)
        .expect("replication_factor 3 implies at least one non-primary replica")
        .clone();

    cluster.kill_worker(&victim);

    // wait past heartbeat_timeout plus a failure-sweep interval for the
    // controller to notice and recovery to run.
    sleep(Duration::from_millis(1500)).await;

    let victim_index = cluster.worker_ids.iter().position(|id| *id == victim).unwrap();
    let victim_url = &cluster.worker_urls[victim_index];

    let mut hits = 0;
    for (i, url) in cluster.worker_urls.iter().enumerate() {
        if i == victim_index {
            continue;
        }
        if cluster.get(url, key).await.status() == 200 {
            hits += 1;
        }
    }
    assert!(
        hits >= cluster.config.sync_replicas,
        "key only readable from {hits} surviving workers, need {}",
        cluster.config.sync_replicas
    );

    let query = cluster.query(key).await;
    let replica_ids: Vec<String> = query["replica_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap().to_string())
        .collect();
    assert!(
        !replica_ids.contains(&victim),
        "dead worker {victim} still named as a replica: {replica_ids:?}"
    );
    assert_ne!(query["primary_worker"].as_str().unwrap(), victim_url);

    Ok(())
}

#[tokio::test]
async fn successful_writes_leave_sync_replicas_copies_live() -> Result<()> {
    let cluster = start_cluster(4, 3, 2).await?;

    for i in 0..4 {
        let key = format!("rk-{i}");
        let resp = cluster.put(&cluster.worker_urls[0], &key, "v").await;
        assert_eq!(resp.status(), 200);
    }

    for i in 0..4 {
        let key = format!("rk-{i}");
        let mut hits = 0;
        for url in &cluster.worker_urls {
            if cluster.get(url, &key).await.status() == 200 {
                hits += 1;
            }
        }
        assert!(
            hits >= cluster.config.sync_replicas,
            "key {key} only on {hits} workers"
        );
    }

    Ok(())
}
