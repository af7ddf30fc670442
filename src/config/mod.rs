//! Configuration Module - TOML-based Desk Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Data source locations, the capital base, chat sampling parameters
//! and server addresses are externalized here - nothing is hardcoded
//! in the domain layer beyond the documented defaults.

pub mod loader;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Top-level configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the server begins accepting requests.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity and logging.
  pub app: AppSection,
  /// HTTP shell binding.
  #[serde(default)]
  pub server: ServerConfig,
  /// Tabular data sources and KPI parameters.
  pub data: DataConfig,
  /// Completion service and cost display parameters.
  #[serde(default)]
  pub chat: ChatConfig,
  /// Credential store location.
  pub auth: AuthConfig,
  /// Metrics and health endpoints.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// HTTP shell configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Bind address for the JSON API.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind_address: default_bind_address(),
    }
  }
}

/// Tabular data configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
  /// Trade ledger CSV: `http(s)://` URL or filesystem path.
  pub ledger_location: String,
  /// Live positions CSV: `http(s)://` URL or filesystem path.
  pub live_positions_location: String,
  /// Fixed capital base for the percentage KPI.
  #[serde(default = "default_capital")]
  pub capital: Decimal,
  /// Read ambiguous numeric dates as day-first (`05/03/2024` = 5 March).
  #[serde(default)]
  pub day_first: bool,
  /// Timeout for fetching a remote CSV (seconds).
  #[serde(default = "default_fetch_timeout")]
  pub fetch_timeout_seconds: u64,
}

/// Completion service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
  /// Base URL of an OpenAI-compatible API.
  #[serde(default = "default_api_base_url")]
  pub api_base_url: String,
  /// Model identifier; also selects the cost rate pair.
  #[serde(default = "default_model")]
  pub model: String,
  /// Environment variable holding the API key.
  #[serde(default = "default_api_key_env")]
  pub api_key_env: String,
  /// Request timeout (seconds).
  #[serde(default = "default_chat_timeout")]
  pub timeout_seconds: u64,
  /// Sampling temperature.
  #[serde(default = "default_temperature")]
  pub temperature: f32,
  /// Nucleus sampling threshold.
  #[serde(default = "default_top_p")]
  pub top_p: f32,
  /// Frequency penalty.
  #[serde(default = "default_frequency_penalty")]
  pub frequency_penalty: f32,
  /// Maximum output tokens.
  #[serde(default = "default_max_tokens")]
  pub max_tokens: u32,
  /// USD → INR conversion used by the cost estimate.
  #[serde(default = "default_exchange_rate")]
  pub exchange_rate: Decimal,
}

impl Default for ChatConfig {
  fn default() -> Self {
    Self {
      api_base_url: default_api_base_url(),
      model: default_model(),
      api_key_env: default_api_key_env(),
      timeout_seconds: default_chat_timeout(),
      temperature: default_temperature(),
      top_p: default_top_p(),
      frequency_penalty: default_frequency_penalty(),
      max_tokens: default_max_tokens(),
      exchange_rate: default_exchange_rate(),
    }
  }
}

/// Credential store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
  /// TOML file with a `[passwords]` table. Never committed to git.
  pub credentials_path: String,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_bind_address() -> String {
  "0.0.0.0:8000".to_string()
}

fn default_capital() -> Decimal {
  Decimal::from(900_000)
}

fn default_fetch_timeout() -> u64 {
  30
}

fn default_api_base_url() -> String {
  "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
  "gpt-3.5-turbo".to_string()
}

fn default_api_key_env() -> String {
  "OPENAI_API_KEY".to_string()
}

fn default_chat_timeout() -> u64 {
  60
}

fn default_temperature() -> f32 {
  0.4
}

fn default_top_p() -> f32 {
  0.95
}

fn default_frequency_penalty() -> f32 {
  0.3
}

fn default_max_tokens() -> u32 {
  700
}

fn default_exchange_rate() -> Decimal {
  crate::domain::cost::DEFAULT_EXCHANGE_RATE
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_health_port() -> u16 {
  8080
}
