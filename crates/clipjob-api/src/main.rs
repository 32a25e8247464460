//! clipjob API server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clipjob_media::{YtDlp, YtDlpConfig};
use clipjob_ml_client::MlClient;
use clipjob_registry::JobRegistry;
use clipjob_worker::{JobExecutor, WorkerConfig};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipjob_api::{create_router, metrics, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    init_tracing()?;
    info!("Starting clipjob-api");

    let config = ApiConfig::from_env();
    let worker_config = WorkerConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        work_dir = %worker_config.work_dir.display(),
        max_concurrent_jobs = worker_config.max_concurrent_jobs,
        "Loaded configuration"
    );

    tokio::fs::create_dir_all(&worker_config.work_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create work directory {}",
                worker_config.work_dir.display()
            )
        })?;

    let ytdlp = YtDlp::new(YtDlpConfig::from_env());
    if !ytdlp.is_available() {
        warn!(binary = %ytdlp.config().binary, "yt-dlp not found; submitted jobs will fail");
    }
    let ml_client = Arc::new(MlClient::from_env().context("Failed to create ML client")?);
    info!(ml_service = %ml_client.config().base_url, "ML service configured");

    let executor = JobExecutor::new(
        worker_config,
        Arc::new(JobRegistry::new()),
        Arc::new(ytdlp),
        ml_client.clone(),
        ml_client,
    );
    let state = AppState::new(config.clone(), executor);

    let metrics_handle = if config.metrics_enabled {
        info!("Prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics().context("Failed to install Prometheus recorder")?)
    } else {
        None
    };

    let app = create_router(state, metrics_handle);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Colored output for development, JSON when `LOG_FORMAT=json`.
fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive("clipjob=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
