// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use batchy::api::{build_router, ApiState};
use batchy::batch::BatchChangeService;
use batchy::config::Config;
use batchy::constants::TOKIO_WORKER_THREADS;
use batchy::converter::{ChangeCommand, QueueingBatchConverter};
use batchy::repository::memory::{
    InMemoryBatchChangeRepository, InMemoryRecordSetRepository, InMemoryZoneRepository, SeedData,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Batch DNS record-change intake service.
#[derive(Debug, Parser)]
#[command(name = "batchy", version, about)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, env = "BATCHY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured API port
    #[arg(long, env = "BATCHY_PORT")]
    port: Option<u16>,
}

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("batchy")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Initialize logging with custom format
///
/// Respects `RUST_LOG` environment variable if set, otherwise defaults to INFO level.
/// Respects `RUST_LOG_FORMAT` environment variable for output format (json or text).
fn initialize_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting Batchy batch change service");
}

async fn async_main() -> Result<()> {
    initialize_logging();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    debug!(?config, "Configuration loaded");

    let zone_repo = Arc::new(InMemoryZoneRepository::new());
    let record_set_repo = Arc::new(InMemoryRecordSetRepository::new());
    let batch_repo = Arc::new(InMemoryBatchChangeRepository::new());

    if let Some(seed_path) = &config.seed_file {
        let seed = SeedData::load(seed_path)
            .with_context(|| format!("loading seed file {}", seed_path.display()))?;
        seed.install(zone_repo.as_ref(), record_set_repo.as_ref())
            .await;
    } else {
        warn!("No seed file configured; zone store starts empty");
    }

    let (sender, receiver) = mpsc::unbounded_channel();
    let converter = Arc::new(QueueingBatchConverter::new(batch_repo.clone(), sender));

    let service = BatchChangeService::new(
        zone_repo,
        record_set_repo,
        batch_repo,
        converter,
        Arc::new(config.clone()),
    )?;

    // Applying queued changes against DNS authorities is the change
    // processor's job; this drain keeps the queue moving and visible.
    tokio::spawn(drain_change_queue(receiver));

    let state = Arc::new(ApiState { service });
    let router = build_router(state);

    let address = format!("{}:{}", config.api.bind_address, config.api.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down");
    Ok(())
}

async fn drain_change_queue(mut receiver: mpsc::UnboundedReceiver<ChangeCommand>) {
    while let Some(command) = receiver.recv().await {
        info!(
            batch_change_id = %command.batch_change_id,
            zone = %command.change.zone_name,
            record_name = %command.change.record_name,
            record_type = %command.change.record_type,
            "Change ready for processing"
        );
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "Failed to listen for shutdown signal");
    } else {
        info!("Shutdown signal received");
    }
}
