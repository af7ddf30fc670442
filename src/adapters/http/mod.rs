//! HTTP Shell Adapter
//!
//! axum 0.7 JSON API over the use cases. Sessions live in memory
//! and are addressed by the `x-session-id` header.
//!
//! Sub-modules:
//! - `routes`: router, shared state and handlers
//! - `sessions`: session store and header extraction
//! - `error`: `DeskError` → status code + static message

pub mod error;
pub mod routes;
pub mod sessions;

pub use routes::{AppState, router};
pub use sessions::{SESSION_HEADER, SessionStore};

use axum::Router;
use tokio::sync::broadcast;
use tracing::info;

/// Serve `app` on `bind_address` until the shutdown signal fires.
pub async fn serve(
  app: Router,
  bind_address: &str,
  mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
  let listener = tokio::net::TcpListener::bind(bind_address).await?;
  info!(address = %bind_address, "HTTP shell listening");

  axum::serve(listener, app)
    .with_graceful_shutdown(async move {
      let _ = shutdown_rx.recv().await;
    })
    .await?;

  Ok(())
}
