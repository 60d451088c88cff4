//! taskgrove - hierarchical task and group tracker served over HTTP

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskgrove::config::Config;
use taskgrove::server;
use taskgrove::storage::DataStore;
use taskgrove::Store;

#[derive(Parser)]
#[command(name = "taskgrove", version, about = "Hierarchical task and group tracker")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "taskgrove.toml")]
    config: PathBuf,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the configured data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Tracing is opt-in via RUST_LOG; default to info-level server events.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    config.validate()?;

    let data_store = DataStore::new(&config.data_dir);
    let (groups, tasks) = data_store
        .load()
        .context("Failed to load persisted dataset")?;
    tracing::info!(groups = groups.len(), tasks = tasks.len(), "dataset loaded");

    let store = Arc::new(Store::new(groups, tasks, config.task_id_length));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(serve(&config, Arc::clone(&store)))?;

    // The server has drained; write the dataset back from a locked snapshot.
    let (groups, tasks) = store.snapshot();
    data_store
        .save(&groups, &tasks)
        .context("Failed to save dataset on shutdown")?;
    tracing::info!("dataset saved, bye");
    Ok(())
}

async fn serve(config: &Config, store: Arc<Store>) -> Result<()> {
    let app = server::router(store, config.default_limit);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
