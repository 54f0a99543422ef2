//! RunGear storefront server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rungear_server::{build_router, open_gateway, AppState, Backend, CliOverrides, ShopConfig};

/// RunGear storefront server
#[derive(Parser)]
#[command(name = "rungear")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path (TOML, or JSON by extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// SQLite database path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Data store backend
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Log as JSON regardless of config
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ShopConfig::load(path)?,
        None => ShopConfig::default(),
    };
    config.apply_env()?;
    config.apply_cli(CliOverrides {
        bind: cli.bind,
        database: cli.database,
        backend: cli.backend,
        json_logs: cli.json_logs,
    });

    rungear_server::logging::init(&config.logging)?;

    let gateway = open_gateway(&config.store)?;
    let state = AppState::new(gateway, &config);
    if let Some(every) = config.sweep_interval() {
        state.spawn_cache_sweeper(every);
    }
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(
        bind = %config.server.bind,
        backend = ?config.store.backend,
        "rungear listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
