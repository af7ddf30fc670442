//! Health Check Server - Liveness and Readiness Probes
//!
//! Exposes /live and /ready endpoints via axum 0.7 for container
//! health checks. Readiness follows the outcome of the most recent
//! ledger load and drops during graceful shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

/// Shared health state polled by readiness probes.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// Whether the last ledger load succeeded.
    ledger_reachable: Arc<AtomicBool>,
    /// Cleared once shutdown begins.
    accepting: Arc<AtomicBool>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Create a new health state (ready by default).
    pub fn new() -> Self {
        Self {
            ledger_reachable: Arc::new(AtomicBool::new(true)),
            accepting: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Record the outcome of a ledger load.
    pub fn record_ledger_load(&self, ok: bool) {
        let was = self.ledger_reachable.swap(ok, Ordering::Relaxed);
        if was && !ok {
            warn!("Ledger source became unreachable; readiness dropped");
        } else if !was && ok {
            info!("Ledger source reachable again");
        }
    }

    /// Mark the service as draining.
    pub fn begin_shutdown(&self) {
        self.accepting.store(false, Ordering::Relaxed);
    }

    /// Check if the service is ready to serve traffic.
    pub fn is_ready(&self) -> bool {
        self.accepting.load(Ordering::Relaxed) && self.ledger_reachable.load(Ordering::Relaxed)
    }
}

/// Axum-based health check HTTP server.
pub struct HealthServer {
    /// Health state shared with the HTTP shell.
    state: HealthState,
    /// Bind port (default 8080 from config).
    port: u16,
}

impl HealthServer {
    /// Create a new health server.
    pub fn new(state: HealthState, port: u16) -> Self {
        Self { state, port }
    }

    /// Build the probe router.
    pub fn router(state: HealthState) -> Router {
        Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .with_state(state)
    }

    /// Serve until the shutdown signal fires.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = Self::router(self.state);

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(address = %addr, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    async fn readiness(State(state): State<HealthState>) -> impl IntoResponse {
        if state.is_ready() {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn test_readiness_follows_ledger_loads() {
        let state = HealthState::new();
        assert!(state.is_ready());
        state.record_ledger_load(false);
        assert!(!state.is_ready());
        state.record_ledger_load(true);
        assert!(state.is_ready());
    }

    #[test]
    fn test_shutdown_clears_readiness() {
        let state = HealthState::new();
        state.begin_shutdown();
        assert!(!state.is_ready());
    }

    #[tokio::test]
    async fn test_ready_endpoint_returns_503_when_ledger_down() {
        let state = HealthState::new();
        state.record_ledger_load(false);
        let app = HealthServer::router(state);

        let resp = app
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
