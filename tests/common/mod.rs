//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;

use cad_relay::config::ServerConfig;
use cad_relay::executor::{CadExecutor, ExecError};
use cad_relay::http::HttpServer;
use cad_relay::lifecycle::Shutdown;
use cad_relay::queue::{ExecOutput, MeshData, OutputKind};

/// Executor fake driven by a closure. Counts invocations; the closure gets
/// the zero-based call sequence number along with the job's kind and code.
pub struct ScriptedExecutor<F> {
    script: F,
    calls: AtomicUsize,
}

impl<F, Fut> ScriptedExecutor<F>
where
    F: Fn(usize, OutputKind, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ExecOutput, ExecError>> + Send + 'static,
{
    pub fn new(script: F) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }
}

impl<F> ScriptedExecutor<F> {
    /// How many times the engine has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<F, Fut> CadExecutor for ScriptedExecutor<F>
where
    F: Fn(usize, OutputKind, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ExecOutput, ExecError>> + Send + 'static,
{
    async fn execute(&self, kind: OutputKind, code: String) -> Result<ExecOutput, ExecError> {
        let seq = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(seq, kind, code).await
    }
}

/// A minimal valid triangle mesh.
pub fn sample_mesh() -> MeshData {
    MeshData {
        vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        faces: vec![0, 1, 2],
    }
}

pub fn structured_ok(message: &str) -> ExecOutput {
    ExecOutput::Structured {
        mesh: sample_mesh(),
        message: message.to_string(),
    }
}

pub fn binary_ok(bytes: &[u8], filename: &str) -> ExecOutput {
    let mut headers = std::collections::HashMap::new();
    headers.insert(
        "content-disposition".to_string(),
        format!("attachment; filename=\"{}\"", filename),
    );
    ExecOutput::Binary {
        bytes: bytes.to_vec(),
        headers,
    }
}

/// Config suitable for tests: admission wide open unless a test says
/// otherwise.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.rate_limit.enabled = false;
    config
}

/// Start a relay server on an ephemeral port around the given executor.
pub async fn start_relay(
    config: ServerConfig,
    executor: Arc<dyn CadExecutor>,
) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = HttpServer::new(config, executor);
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Serve an arbitrary router on an ephemeral port (mock CAD engine).
pub async fn start_mock_engine(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}
