//! Completion Port - Remote Chat-Completion Interface
//!
//! Defines the trait the chat use case needs from a large-language
//! model provider: send an ordered message list with fixed sampling
//! parameters, get generated text back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::chat::ChatTurn;
use crate::error::DeskError;

/// Fixed sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
  /// Sampling temperature.
  pub temperature: f32,
  /// Nucleus sampling threshold.
  pub top_p: f32,
  /// Penalty for repeated tokens.
  pub frequency_penalty: f32,
  /// Maximum output length in tokens.
  pub max_tokens: u32,
}

impl Default for SamplingParams {
  fn default() -> Self {
    Self {
      temperature: 0.4,
      top_p: 0.95,
      frequency_penalty: 0.3,
      max_tokens: 700,
    }
  }
}

/// One outgoing completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
  /// Externally supplied model identifier.
  pub model: String,
  /// System block, context turns and the new question, in order.
  pub messages: Vec<ChatTurn>,
  /// Sampling parameters.
  pub sampling: SamplingParams,
}

/// Trait for chat-completion providers.
///
/// Implementors must map every failure to `RemoteCallFailed` or
/// `RemoteTimeout` and must not retry.
#[async_trait]
pub trait CompletionService: Send + Sync + 'static {
  /// Generate a reply for the given request.
  async fn complete(&self, request: &CompletionRequest) -> Result<String, DeskError>;
}
