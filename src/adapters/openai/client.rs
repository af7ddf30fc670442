//! Completion HTTP Client - OpenAI-compatible Chat API
//!
//! Wraps reqwest with a bearer key and an explicit timeout for the
//! `/chat/completions` endpoint. One attempt per question; no retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope};
use crate::config::ChatConfig;
use crate::error::DeskError;
use crate::ports::completion::{CompletionRequest, CompletionService};

/// Configuration for the completion client.
#[derive(Debug, Clone)]
pub struct CompletionClientConfig {
  /// Base URL, e.g. `https://api.openai.com/v1`.
  pub base_url: String,
  /// Bearer key; `None` makes every call fail with a clear reason.
  pub api_key: Option<String>,
  /// Request timeout.
  pub timeout: Duration,
}

impl Default for CompletionClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.openai.com/v1".to_string(),
      api_key: None,
      timeout: Duration::from_secs(60),
    }
  }
}

impl CompletionClientConfig {
  /// Build from `[chat]` config, reading the key from the named env var.
  pub fn from_chat_config(chat: &ChatConfig) -> Self {
    let api_key = std::env::var(&chat.api_key_env)
      .ok()
      .filter(|k| !k.trim().is_empty());
    if api_key.is_none() {
      warn!(env = %chat.api_key_env, "Completion API key not set; chat replies will be errors");
    }
    Self {
      base_url: chat.api_base_url.trim_end_matches('/').to_string(),
      api_key,
      timeout: Duration::from_secs(chat.timeout_seconds),
    }
  }
}

/// HTTP client for an OpenAI-compatible chat-completion API.
pub struct OpenAiClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: CompletionClientConfig,
}

impl OpenAiClient {
  /// Create a new completion client.
  pub fn new(config: CompletionClientConfig) -> anyhow::Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(2)
      .build()
      .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

    Ok(Self { http, config })
  }

  fn endpoint(&self) -> String {
    format!("{}/chat/completions", self.config.base_url)
  }
}

#[async_trait]
impl CompletionService for OpenAiClient {
  #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
  async fn complete(&self, request: &CompletionRequest) -> Result<String, DeskError> {
    let Some(api_key) = self.config.api_key.as_deref() else {
      return Err(DeskError::RemoteCallFailed("API key not configured".into()));
    };

    let body = ChatCompletionRequest::from(request);
    let response = self
      .http
      .post(self.endpoint())
      .bearer_auth(api_key)
      .json(&body)
      .send()
      .await
      .map_err(|e| self.map_transport_error(&e))?;

    let status = response.status();
    if !status.is_success() {
      let text = response.text().await.unwrap_or_default();
      warn!(status = %status, "Completion API returned an error");
      return Err(map_status_error(status, &text));
    }

    let data: ChatCompletionResponse = response
      .json()
      .await
      .map_err(|e| {
        if e.is_timeout() {
          self.timeout_error()
        } else {
          DeskError::RemoteCallFailed(format!("invalid response body: {e}"))
        }
      })?;

    if let Some(usage) = &data.usage {
      debug!(
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        "Completion usage"
      );
    }

    data
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .filter(|text| !text.trim().is_empty())
      .ok_or_else(|| DeskError::RemoteCallFailed("empty response".into()))
  }
}

impl OpenAiClient {
  fn timeout_error(&self) -> DeskError {
    DeskError::RemoteTimeout(self.config.timeout.as_secs())
  }

  fn map_transport_error(&self, e: &reqwest::Error) -> DeskError {
    if e.is_timeout() {
      self.timeout_error()
    } else if e.is_connect() {
      DeskError::RemoteCallFailed(format!("connection failed: {e}"))
    } else {
      DeskError::RemoteCallFailed(e.to_string())
    }
  }
}

/// Turn a non-2xx status and body into a tagged failure.
pub fn map_status_error(status: StatusCode, body: &str) -> DeskError {
  let detail = serde_json::from_str::<ErrorEnvelope>(body)
    .map(|env| env.error.message)
    .unwrap_or_else(|_| body.chars().take(200).collect());

  let reason = match status {
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => format!("authentication rejected: {detail}"),
    StatusCode::TOO_MANY_REQUESTS => format!("rate limit or quota exceeded: {detail}"),
    StatusCode::NOT_FOUND => format!("model not found: {detail}"),
    s if s.is_server_error() => format!("provider error {s}: {detail}"),
    s => format!("HTTP {s}: {detail}"),
  };
  DeskError::RemoteCallFailed(reason)
}
