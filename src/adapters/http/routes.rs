//! JSON routes for login, dashboard, live positions and chat.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::ApiError;
use super::sessions::{SessionHandle, SessionStore, session_id};
use crate::adapters::metrics::{HealthState, MetricsRegistry};
use crate::domain::chat::ChatTurn;
use crate::domain::cost::CostEstimate;
use crate::domain::ledger::FilterSelection;
use crate::domain::positions::LiveSelection;
use crate::domain::session::{CredentialTable, Session};
use crate::error::DeskError;
use crate::ports::completion::CompletionService;
use crate::ports::table_source::TableSource;
use crate::usecases::{
  ChatAssistant, DashboardService, DashboardView, LivePositionsService, LiveView,
};

/// Everything the handlers share.
pub struct AppState<S: TableSource, C: CompletionService> {
  pub dashboard: DashboardService<S>,
  pub live: LivePositionsService<S>,
  pub chat: ChatAssistant<C>,
  pub credentials: CredentialTable,
  pub sessions: SessionStore,
  pub metrics: Arc<MetricsRegistry>,
  pub health: HealthState,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
  pub session_id: Uuid,
  pub username: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
  pub platform: Option<String>,
  pub strategy: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LiveQuery {
  pub market_cap: Option<String>,
  pub strategy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
  pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatHistory {
  pub username: String,
  pub turns: Vec<ChatTurn>,
  pub stats: CostEstimate,
}

#[derive(Debug, Serialize)]
pub struct ChatAnswer {
  pub reply: String,
  pub elapsed_ms: u64,
  pub stats: CostEstimate,
}

/// Build the API router.
pub fn router<S, C>(state: Arc<AppState<S, C>>) -> Router
where
  S: TableSource,
  C: CompletionService,
{
  Router::new()
    .route("/login", post(login::<S, C>))
    .route("/logout", post(logout::<S, C>))
    .route("/dashboard", get(dashboard::<S, C>))
    .route("/live-positions", get(live_positions::<S, C>))
    .route(
      "/chat",
      get(chat_history::<S, C>)
        .post(chat_ask::<S, C>)
        .delete(chat_clear::<S, C>),
    )
    .with_state(state)
}

/// Resolve the request's session and require it to be authenticated.
async fn authenticated(sessions: &SessionStore, headers: &HeaderMap) -> Result<SessionHandle, ApiError> {
  let id = session_id(headers).ok_or(DeskError::NotAuthenticated)?;
  let handle = sessions.get(&id).await.ok_or(DeskError::NotAuthenticated)?;
  handle.lock().await.require_authenticated()?;
  Ok(handle)
}

async fn login<S: TableSource, C: CompletionService>(
  State(state): State<Arc<AppState<S, C>>>,
  Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
  let mut session = Session::new();
  let outcome = session.login(&state.credentials, &body.username, &body.password);
  state.metrics.record_login(outcome.is_ok());
  if let Err(e) = outcome {
    warn!(username = %body.username, "Login rejected");
    return Err(e.into());
  }

  let session_id = state.sessions.insert(session).await;
  let active = state.sessions.len().await;
  state.metrics.active_sessions.set(i64::try_from(active).unwrap_or(i64::MAX));
  info!(active_sessions = active, "Login accepted");

  Ok(Json(LoginResponse {
    session_id,
    username: body.username,
  }))
}

async fn logout<S: TableSource, C: CompletionService>(
  State(state): State<Arc<AppState<S, C>>>,
  headers: HeaderMap,
) -> StatusCode {
  let Some(id) = session_id(&headers) else {
    return StatusCode::NO_CONTENT;
  };
  if let Some(handle) = state.sessions.remove(&id).await {
    handle.lock().await.logout();
    let active = state.sessions.len().await;
    state.metrics.active_sessions.set(i64::try_from(active).unwrap_or(i64::MAX));
    info!(active_sessions = active, "Logged out");
  }
  StatusCode::NO_CONTENT
}

async fn dashboard<S: TableSource, C: CompletionService>(
  State(state): State<Arc<AppState<S, C>>>,
  headers: HeaderMap,
  Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, ApiError> {
  authenticated(&state.sessions, &headers).await?;

  let selection = FilterSelection::from_choices(query.platform.as_deref(), query.strategy.as_deref());
  let result = state.dashboard.view(&selection).await;
  state.metrics.record_table_load("ledger", result.is_ok());
  state.health.record_ledger_load(result.is_ok());

  Ok(Json(result?))
}

async fn live_positions<S: TableSource, C: CompletionService>(
  State(state): State<Arc<AppState<S, C>>>,
  headers: HeaderMap,
  Query(query): Query<LiveQuery>,
) -> Result<Json<LiveView>, ApiError> {
  authenticated(&state.sessions, &headers).await?;

  let selection = LiveSelection::from_choices(query.market_cap.as_deref(), query.strategy.as_deref());
  let result = state.live.view(&selection).await;
  state.metrics.record_table_load("live", result.is_ok());

  Ok(Json(result?))
}

async fn chat_history<S: TableSource, C: CompletionService>(
  State(state): State<Arc<AppState<S, C>>>,
  headers: HeaderMap,
) -> Result<Json<ChatHistory>, ApiError> {
  let handle = authenticated(&state.sessions, &headers).await?;
  let session = handle.lock().await;

  Ok(Json(ChatHistory {
    username: session.require_authenticated()?.to_string(),
    turns: session.transcript.turns().to_vec(),
    stats: state.chat.stats(&session.transcript),
  }))
}

async fn chat_ask<S: TableSource, C: CompletionService>(
  State(state): State<Arc<AppState<S, C>>>,
  headers: HeaderMap,
  Json(body): Json<ChatRequest>,
) -> Result<Json<ChatAnswer>, ApiError> {
  let handle = authenticated(&state.sessions, &headers).await?;
  let mut session = handle.lock().await;

  let reply = state.chat.ask(&mut session.transcript, &body.question).await?;
  #[allow(clippy::cast_precision_loss)]
  let elapsed_secs = reply.elapsed_ms as f64 / 1000.0;
  state
    .metrics
    .record_chat(state.chat.model(), reply.outcome(), elapsed_secs);

  Ok(Json(ChatAnswer {
    stats: state.chat.stats(&session.transcript),
    elapsed_ms: reply.elapsed_ms,
    reply: reply.text,
  }))
}

async fn chat_clear<S: TableSource, C: CompletionService>(
  State(state): State<Arc<AppState<S, C>>>,
  headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
  let handle = authenticated(&state.sessions, &headers).await?;
  handle.lock().await.transcript.clear();
  Ok(StatusCode::NO_CONTENT)
}
