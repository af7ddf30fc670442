//! In-memory session store keyed by random session ids.
//!
//! Each session sits behind its own async mutex, so one request at a
//! time mutates it even while a chat dispatch is in flight.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::HeaderMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::domain::session::Session;

/// Header carrying the session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Handle to one session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Sessions live until logout; there is no expiry, so every login
/// that is never followed by a logout stays in the map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
  inner: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store `session` under a fresh id.
  pub async fn insert(&self, session: Session) -> Uuid {
    let id = Uuid::new_v4();
    self
      .inner
      .write()
      .await
      .insert(id, Arc::new(Mutex::new(session)));
    id
  }

  pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
    self.inner.read().await.get(id).cloned()
  }

  pub async fn remove(&self, id: &Uuid) -> Option<SessionHandle> {
    self.inner.write().await.remove(id)
  }

  pub async fn len(&self) -> usize {
    self.inner.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.inner.read().await.is_empty()
  }
}

/// Session id from the request headers, if present and well-formed.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
  headers
    .get(SESSION_HEADER)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| Uuid::parse_str(v.trim()).ok())
}
