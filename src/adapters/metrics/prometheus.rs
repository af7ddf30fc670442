//! Prometheus Metrics Registry - Desk Observability
//!
//! Registers and exposes Prometheus metrics for Grafana dashboards:
//! data-source loads, chat dispatch outcomes and latency, login
//! attempts and live sessions.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

/// Centralized Prometheus metrics for the desk.
///
/// All metrics follow the naming convention `ledger_desk_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Table loads by source kind (`ledger`, `live`) and outcome.
    pub table_loads: IntCounterVec,
    /// Chat dispatches by model and outcome (`ok`, `failed`, `timeout`).
    pub chat_requests: IntCounterVec,
    /// Chat dispatch latency (seconds).
    pub chat_latency_seconds: HistogramVec,
    /// Login attempts by outcome.
    pub login_attempts: IntCounterVec,
    /// Sessions currently held by the shell.
    pub active_sessions: IntGauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let table_loads = IntCounterVec::new(
            Opts::new("ledger_desk_table_loads_total", "Tabular source loads"),
            &["source", "outcome"],
        )?;

        let chat_requests = IntCounterVec::new(
            Opts::new(
                "ledger_desk_chat_requests_total",
                "Questions dispatched to the completion service",
            ),
            &["model", "outcome"],
        )?;

        let chat_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "ledger_desk_chat_latency_seconds",
                "Completion round-trip latency in seconds",
            )
            .buckets(vec![0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
            &["model"],
        )?;

        let login_attempts = IntCounterVec::new(
            Opts::new("ledger_desk_login_attempts_total", "Login attempts"),
            &["outcome"],
        )?;

        let active_sessions = IntGauge::new(
            "ledger_desk_active_sessions",
            "Sessions currently held in memory",
        )?;

        registry.register(Box::new(table_loads.clone()))?;
        registry.register(Box::new(chat_requests.clone()))?;
        registry.register(Box::new(chat_latency_seconds.clone()))?;
        registry.register(Box::new(login_attempts.clone()))?;
        registry.register(Box::new(active_sessions.clone()))?;

        Ok(Self {
            registry,
            table_loads,
            chat_requests,
            chat_latency_seconds,
            login_attempts,
            active_sessions,
        })
    }

    /// Count one table load.
    pub fn record_table_load(&self, source: &str, ok: bool) {
        self.table_loads
            .with_label_values(&[source, if ok { "ok" } else { "unavailable" }])
            .inc();
    }

    /// Count one chat dispatch and observe its latency.
    pub fn record_chat(&self, model: &str, outcome: &str, elapsed_secs: f64) {
        self.chat_requests.with_label_values(&[model, outcome]).inc();
        self.chat_latency_seconds
            .with_label_values(&[model])
            .observe(elapsed_secs);
    }

    /// Count one login attempt.
    pub fn record_login(&self, ok: bool) {
        self.login_attempts
            .with_label_values(&[if ok { "accepted" } else { "rejected" }])
            .inc();
    }

    /// Render the registry in the text exposition format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    metrics.render().map_err(|e| {
                        error!(error = %e, "Failed to encode metrics");
                        StatusCode::INTERNAL_SERVER_ERROR
                    })
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
