#![allow(dead_code)]

use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crudcheck_harness::server::{ReadinessPolicy, ServerConfig};

/// Reference backend running in-process on an ephemeral port
pub struct Backend {
    pub port: u16,
    task: JoinHandle<()>,
}

impl Drop for Backend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn spawn_backend(static_dir: PathBuf) -> Backend {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind backend");
    let port = listener.local_addr().expect("local addr").port();
    let task = tokio::spawn(async move {
        let _ = crudcheck_server::serve_on(listener, static_dir, std::future::pending()).await;
    });
    Backend { port, task }
}

/// A port nothing is listening on
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    listener.local_addr().expect("local addr").port()
}

pub fn sample_app() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/sample-app")
}

pub fn quick_readiness(timeout_ms: u64) -> ReadinessPolicy {
    ReadinessPolicy {
        warmup_ms: 0,
        initial_backoff_ms: 20,
        max_backoff_ms: 100,
        timeout_ms,
    }
}

/// A long-lived stand-in process; liveness comes from whatever listens on `port`
pub fn placeholder_server(port: u16, timeout_ms: u64) -> ServerConfig {
    ServerConfig {
        command: vec!["sh".to_string(), "-c".to_string(), "sleep 30".to_string()],
        host: "127.0.0.1".to_string(),
        port,
        readiness: quick_readiness(timeout_ms),
        ..Default::default()
    }
}
