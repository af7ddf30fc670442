//! Chat Assistant - Question Dispatch and Transcript Upkeep
//!
//! Turns a free-text question into a completion request built from
//! the session's recent turns, sends it once, and records both the
//! question and the reply (or a displayable error line).

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::ChatConfig;
use crate::domain::chat::{Role, Transcript, build_request_context};
use crate::domain::cost::{CostEstimate, estimate_cost};
use crate::error::DeskError;
use crate::ports::completion::{CompletionRequest, CompletionService, SamplingParams};

/// Prefix for failures shown in place of a reply.
pub const ERROR_PREFIX: &str = "❌ Error: ";

/// Result of one question, as shown to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
  /// Reply text, or the error line that replaced it.
  pub text: String,
  /// Underlying failure, if the dispatch failed.
  #[serde(skip)]
  pub failure: Option<DeskError>,
  /// Round-trip time in milliseconds.
  pub elapsed_ms: u64,
}

impl ChatReply {
  /// Outcome label for metrics: `ok`, `failed` or `timeout`.
  pub fn outcome(&self) -> &'static str {
    match self.failure {
      None => "ok",
      Some(DeskError::RemoteTimeout(_)) => "timeout",
      Some(_) => "failed",
    }
  }
}

/// Chat use case bound to one completion service and model.
pub struct ChatAssistant<C: CompletionService> {
  service: Arc<C>,
  model: String,
  sampling: SamplingParams,
  exchange_rate: Decimal,
}

impl<C: CompletionService> ChatAssistant<C> {
  /// Create an assistant from `[chat]` config.
  pub fn new(service: Arc<C>, chat: &ChatConfig) -> Self {
    Self {
      service,
      model: chat.model.clone(),
      sampling: SamplingParams {
        temperature: chat.temperature,
        top_p: chat.top_p,
        frequency_penalty: chat.frequency_penalty,
        max_tokens: chat.max_tokens,
      },
      exchange_rate: chat.exchange_rate,
    }
  }

  pub fn model(&self) -> &str {
    &self.model
  }

  /// Send `question` with context from `transcript`. The transcript is not touched.
  #[instrument(skip(self, transcript, question), fields(model = %self.model, prior = transcript.len()))]
  pub async fn dispatch(&self, transcript: &Transcript, question: &str) -> Result<String, DeskError> {
    let request = CompletionRequest {
      model: self.model.clone(),
      messages: build_request_context(transcript, question),
      sampling: self.sampling,
    };
    self.service.complete(&request).await
  }

  /// Ask a question and record the exchange.
  ///
  /// Remote failures never propagate: they become an assistant turn
  /// starting with [`ERROR_PREFIX`]. Only a blank question is an error.
  pub async fn ask(&self, transcript: &mut Transcript, question: &str) -> Result<ChatReply, DeskError> {
    if question.trim().is_empty() {
      return Err(DeskError::EmptyTurn);
    }

    let started = Instant::now();
    let result = self
      .dispatch(transcript, question)
      .await
      .and_then(|text| {
        if text.trim().is_empty() {
          Err(DeskError::RemoteCallFailed("empty response".into()))
        } else {
          Ok(text)
        }
      });
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (text, failure) = match result {
      Ok(text) => {
        info!(elapsed_ms, chars = text.chars().count(), "Chat reply received");
        (text, None)
      }
      Err(e) => {
        warn!(error = %e, elapsed_ms, "Chat dispatch failed");
        (format!("{ERROR_PREFIX}{e}"), Some(e))
      }
    };

    transcript.append(Role::User, question)?;
    transcript.append(Role::Assistant, text.clone())?;

    Ok(ChatReply {
      text,
      failure,
      elapsed_ms,
    })
  }

  /// Running cost estimate for the transcript.
  pub fn stats(&self, transcript: &Transcript) -> CostEstimate {
    estimate_cost(transcript.len(), &self.model, self.exchange_rate)
  }
}
