//! Chat-Completion API Adapter
//!
//! Implements the `CompletionService` port against any
//! OpenAI-compatible `/chat/completions` endpoint.
//!
//! Sub-modules:
//! - `client`: HTTP client with bearer auth, timeout and error tagging
//! - `types`: API request/response type definitions

pub mod client;
pub mod types;

pub use client::{CompletionClientConfig, OpenAiClient};
