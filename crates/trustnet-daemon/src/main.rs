// crates/trustnet-daemon/src/main.rs
//
// Binary entrypoint for the trustnet daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration,
// constructs the shared store, compute engine, and job scheduler, and
// starts the RPC server.

mod config;

use std::sync::Arc;

use clap::Parser;
use config::DaemonConfig;

use trustnet_core::{LogSink, SinkRegistry};
use trustnet_engine::ComputeEngine;
use trustnet_rpc::{RpcConfig, TrustNetRpcServer};
use trustnet_scheduler::JobScheduler;
use trustnet_store::TrustStore;

/// Trustnet daemon — serves trust state and periodic EigenTrust jobs.
#[derive(Parser, Debug)]
#[command(name = "trustnet-daemon", version = "0.1.0", about = "Trust computation node daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "trustnet.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found.
    let daemon_config = match DaemonConfig::load(&args.config) {
        Ok(cfg) => cfg,
        Err(_) => DaemonConfig::default(),
    };

    // Initialize tracing subscriber for structured logging. RUST_LOG
    // overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    tracing::info!("trustnet daemon v0.1.0");
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );

    // ---------------------------------------------------------------
    // Shared state: store, sinks, engine, scheduler.
    // ---------------------------------------------------------------
    let store = Arc::new(TrustStore::new());

    let mut sinks = SinkRegistry::new();
    sinks.register("log", Arc::new(LogSink));
    let sinks = Arc::new(sinks);

    let engine = Arc::new(ComputeEngine::new(store.clone(), sinks));
    let scheduler = Arc::new(JobScheduler::new(store.clone(), engine.clone()));

    // The scheduler observes store updates so periodic jobs can react
    // to new trust data.
    store.add_observer(scheduler.clone()).await;

    // ---------------------------------------------------------------
    // RPC server.
    // ---------------------------------------------------------------
    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    let rpc_server = TrustNetRpcServer::new(rpc_config, store, engine, scheduler);

    let rpc_handle = tokio::spawn(async move {
        if let Err(e) = rpc_server.start().await {
            tracing::error!("RPC server error: {}", e);
        }
    });

    // Run until Ctrl-C, then shut down.
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping");
    rpc_handle.abort();

    Ok(())
}
