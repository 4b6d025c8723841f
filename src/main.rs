use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use towertrack_api::cli::{Cli, Commands};
use towertrack_api::config::AppConfig;
use towertrack_api::database::open_store;
use towertrack_api::services::reconcile;
use towertrack_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("towertrack_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting TowerTrack API in {:?} mode", config.environment);

    let store = open_store(&config).await.context("failed to open store")?;

    // Agreement routes must not take traffic until duplicates are gone and
    // the uniqueness constraint is in place.
    let (ready, report) = reconcile(store.as_ref())
        .await
        .context("agreement reconciliation failed")?;

    if cli.command() == Commands::Reconcile {
        println!(
            "Reconciled {} agreements: {} duplicate groups, {} removed",
            report.scanned, report.duplicate_groups, report.removed
        );
        return Ok(());
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config, store).context("failed to build application state")?;
    let app = app(state, ready);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("TowerTrack API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
