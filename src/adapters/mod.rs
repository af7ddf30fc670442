//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies, and exposes the use cases over HTTP.
//!
//! Adapter categories:
//! - `csv`: CSV tables from URLs or files
//! - `openai`: OpenAI-compatible chat-completion client
//! - `http`: axum JSON shell with in-memory sessions
//! - `metrics`: Prometheus metrics export and health checks

pub mod csv;
pub mod http;
pub mod metrics;
pub mod openai;
