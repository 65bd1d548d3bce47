//! CAD relay server binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use cad_relay::config::{load_config, ServerConfig};
use cad_relay::executor::CadQueryEngine;
use cad_relay::http::HttpServer;
use cad_relay::lifecycle::{signals, Shutdown};
use cad_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "cad-relay")]
#[command(about = "HTTP relay serializing CAD generation jobs", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => load_config(&path)?,
        None => ServerConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        engine = %config.executor.base_url,
        execution_timeout_secs = config.queue.execution_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let executor = Arc::new(CadQueryEngine::new(&config.executor)?);
    let shutdown = Shutdown::new();
    signals::watch(shutdown.clone());

    let server = HttpServer::new(config, executor);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
