//! Ledger Desk - Entry Point
//!
//! Initializes configuration, logging, data sources and the chat
//! client, then serves the JSON API until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Load the credential table
//! 4. Create the CSV table source and the completion client
//! 5. Probe the ledger once so readiness starts accurate
//! 6. Spawn health (/live + /ready) and Prometheus (/metrics) servers
//! 7. Serve the JSON API
//! 8. Wait for SIGINT → drain → exit

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use ledger_desk::adapters::csv::CsvTableSource;
use ledger_desk::adapters::http::{self, AppState, SessionStore};
use ledger_desk::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use ledger_desk::adapters::openai::{CompletionClientConfig, OpenAiClient};
use ledger_desk::config;
use ledger_desk::usecases::{ChatAssistant, DashboardService, LivePositionsService};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.app.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        model = %config.chat.model,
        "Starting Ledger Desk"
    );

    // ── 3. Credentials (read-only for the process lifetime) ─
    let credentials = config::loader::load_credentials(&config.auth.credentials_path)
        .context("Failed to load credentials")?;

    // ── 4. Adapters ─────────────────────────────────────────
    let source = Arc::new(
        CsvTableSource::new(Duration::from_secs(config.data.fetch_timeout_seconds))
            .context("Failed to create table source")?,
    );
    let completion = Arc::new(
        OpenAiClient::new(CompletionClientConfig::from_chat_config(&config.chat))
            .context("Failed to create completion client")?,
    );
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let health = HealthState::new();

    let dashboard = DashboardService::new(Arc::clone(&source), &config.data);

    // ── 5. Initial ledger probe ─────────────────────────────
    match dashboard.load_ledger().await {
        Ok(ledger) => {
            info!(rows = ledger.len(), "Ledger reachable at startup");
            metrics.record_table_load("ledger", true);
        }
        Err(e) => {
            warn!(error = %e, "Ledger unreachable at startup; serving anyway");
            metrics.record_table_load("ledger", false);
            health.record_ledger_load(false);
        }
    }

    let state = Arc::new(AppState {
        dashboard,
        live: LivePositionsService::new(Arc::clone(&source), &config.data),
        chat: ChatAssistant::new(completion, &config.chat),
        credentials,
        sessions: SessionStore::new(),
        metrics: Arc::clone(&metrics),
        health: health.clone(),
    });

    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 6. Health + metrics servers ─────────────────────────
    let health_server = HealthServer::new(health.clone(), config.metrics.health_port);
    let health_shutdown = shutdown_tx.subscribe();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health_server.run(health_shutdown).await {
            error!(error = %e, "Health server failed");
        }
    });

    let metrics_handle = if config.metrics.enabled {
        let metrics_shutdown = shutdown_tx.subscribe();
        let bind = config.metrics.bind_address.clone();
        let registry = Arc::clone(&metrics);
        Some(tokio::spawn(async move {
            if let Err(e) = registry.serve(bind, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }))
    } else {
        info!("Metrics export disabled");
        None
    };

    // ── 7. JSON API ─────────────────────────────────────────
    let app = http::router(state);
    let api_shutdown = shutdown_tx.subscribe();
    let bind = config.server.bind_address.clone();
    let api_handle = tokio::spawn(async move {
        if let Err(e) = http::serve(app, &bind, api_shutdown).await {
            error!(error = %e, "HTTP shell failed");
        }
    });

    info!("All servers spawned; desk is running");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for SIGINT");
    }
    info!("SIGINT received, initiating graceful shutdown");

    // Readiness drops before connections drain.
    health.begin_shutdown();
    let _ = shutdown_tx.send(());

    let _ = tokio::time::timeout(Duration::from_secs(10), api_handle).await;
    if let Some(handle) = metrics_handle {
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;
    }
    let _ = tokio::time::timeout(Duration::from_secs(2), health_handle).await;

    info!("Shutdown complete");
    Ok(())
}
