//! Chat-Completion API Request/Response Types
//!
//! Serialization types for the OpenAI-compatible
//! `POST /chat/completions` endpoint.

use serde::{Deserialize, Serialize};

use crate::ports::completion::CompletionRequest;

/// Request payload.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest<'a> {
  pub model: &'a str,
  pub messages: Vec<WireMessage<'a>>,
  pub temperature: f32,
  pub top_p: f32,
  pub frequency_penalty: f32,
  pub max_tokens: u32,
}

/// One role/content pair on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage<'a> {
  pub role: String,
  pub content: &'a str,
}

impl<'a> From<&'a CompletionRequest> for ChatCompletionRequest<'a> {
  fn from(req: &'a CompletionRequest) -> Self {
    Self {
      model: &req.model,
      messages: req
        .messages
        .iter()
        .map(|turn| WireMessage {
          role: turn.role.to_string(),
          content: &turn.content,
        })
        .collect(),
      temperature: req.sampling.temperature,
      top_p: req.sampling.top_p,
      frequency_penalty: req.sampling.frequency_penalty,
      max_tokens: req.sampling.max_tokens,
    }
  }
}

/// Successful response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
  pub choices: Vec<Choice>,
  /// Token usage as reported by the provider.
  pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
  pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
  pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
  pub prompt_tokens: Option<u32>,
  pub completion_tokens: Option<u32>,
  pub total_tokens: Option<u32>,
}

/// Error envelope: `{"error": {"message": ..., "type": ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
  pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
  pub message: String,
  #[serde(rename = "type")]
  pub kind: Option<String>,
  pub code: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::chat::{ChatTurn, Role};
  use crate::ports::completion::SamplingParams;

  #[test]
  fn test_request_wire_shape() {
    let req = CompletionRequest {
      model: "gpt-4o-mini".into(),
      messages: vec![
        ChatTurn::new(Role::System, "sys"),
        ChatTurn::new(Role::User, "Analyze TCS"),
      ],
      sampling: SamplingParams::default(),
    };
    let body = serde_json::to_value(ChatCompletionRequest::from(&req)).unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "Analyze TCS");
    assert_eq!(body["max_tokens"], 700);
    assert!((body["temperature"].as_f64().unwrap() - 0.4).abs() < 1e-6);
  }

  #[test]
  fn test_error_envelope_parses() {
    let raw = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
    let env: ErrorEnvelope = serde_json::from_str(raw).unwrap();
    assert_eq!(env.error.kind.as_deref(), Some("insufficient_quota"));
  }
}
