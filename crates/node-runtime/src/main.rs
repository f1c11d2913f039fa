//! # Transaction Ledger Node
//!
//! Entry point for the record store runtime.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (stderr; stdout carries responses)
//! 2. Load configuration from the environment
//! 3. Open the world state and seed it if empty
//! 4. Serve invocations from stdin until EOF or Ctrl+C

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use node_runtime::{spawn_line_reader, NodeConfig, NodeRuntime};

/// Requests buffered between the stdin reader thread and the serve loop.
const REQUEST_BUFFER: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("===========================================");
    info!("  Transaction Ledger Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    // Load configuration
    let config = NodeConfig::from_env().context("invalid configuration")?;
    if !config.chaincode_id.is_empty() {
        info!("Chaincode ID: {}", config.chaincode_id);
    }
    if !config.server_address.is_empty() {
        info!(
            "Server address {} configured; invocations are read from stdin",
            config.server_address
        );
    }

    let mut runtime = NodeRuntime::open(config)?;

    info!("Serving invocations on stdin. Press Ctrl+C to stop.");
    let requests = spawn_line_reader(std::io::BufReader::new(std::io::stdin()), REQUEST_BUFFER)?;
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    // The reader thread may still be blocked on stdin; it is not waited for
    runtime
        .serve_until(requests, tokio::io::stdout(), shutdown)
        .await?;

    Ok(())
}
