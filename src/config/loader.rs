//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml` and the credential file,
//! validating all parameters, and providing clear error messages
//! for misconfiguration.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use super::AppConfig;
use crate::domain::session::CredentialTable;

/// Load and validate configuration from a TOML file.
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    ledger = %config.data.ledger_location,
    live = %config.data.live_positions_location,
    capital = %config.data.capital,
    model = %config.chat.model,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  Ok(config)
}

/// Shape of the credential file.
#[derive(Debug, Deserialize)]
struct CredentialFile {
  passwords: HashMap<String, String>,
}

/// Load the username → password table from a TOML file.
///
/// The file must contain a `[passwords]` table with at least one entry.
pub fn load_credentials(path: &str) -> Result<CredentialTable> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read credentials file: {path}"))?;

  let parsed: CredentialFile = toml::from_str(&content)
    .with_context(|| format!("Failed to parse credentials file: {path}"))?;

  anyhow::ensure!(
    !parsed.passwords.is_empty(),
    "Credentials file {} has an empty [passwords] table",
    path
  );

  info!(users = parsed.passwords.len(), "Credentials loaded");

  Ok(CredentialTable::new(parsed.passwords))
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty data source locations
/// - Positive capital base
/// - Sampling parameters in their documented ranges
/// - Non-zero timeouts
fn validate_config(config: &AppConfig) -> Result<()> {
  // Data validation
  anyhow::ensure!(
    !config.data.ledger_location.trim().is_empty(),
    "data.ledger_location must not be empty"
  );
  anyhow::ensure!(
    !config.data.live_positions_location.trim().is_empty(),
    "data.live_positions_location must not be empty"
  );
  anyhow::ensure!(
    config.data.capital > rust_decimal::Decimal::ZERO,
    "data.capital must be positive, got {}",
    config.data.capital
  );
  anyhow::ensure!(
    config.data.fetch_timeout_seconds > 0,
    "data.fetch_timeout_seconds must be positive"
  );

  // Chat validation
  anyhow::ensure!(
    !config.chat.model.trim().is_empty(),
    "chat.model must not be empty"
  );
  anyhow::ensure!(
    !config.chat.api_base_url.trim().is_empty(),
    "chat.api_base_url must not be empty"
  );
  anyhow::ensure!(
    (0.0..=2.0).contains(&config.chat.temperature),
    "chat.temperature must be in [0, 2], got {}",
    config.chat.temperature
  );
  anyhow::ensure!(
    config.chat.top_p > 0.0 && config.chat.top_p <= 1.0,
    "chat.top_p must be in (0, 1], got {}",
    config.chat.top_p
  );
  anyhow::ensure!(
    (-2.0..=2.0).contains(&config.chat.frequency_penalty),
    "chat.frequency_penalty must be in [-2, 2], got {}",
    config.chat.frequency_penalty
  );
  anyhow::ensure!(
    config.chat.max_tokens > 0,
    "chat.max_tokens must be positive"
  );
  anyhow::ensure!(
    config.chat.timeout_seconds > 0,
    "chat.timeout_seconds must be positive"
  );
  anyhow::ensure!(
    config.chat.exchange_rate > rust_decimal::Decimal::ZERO,
    "chat.exchange_rate must be positive"
  );

  // Auth validation
  anyhow::ensure!(
    !config.auth.credentials_path.trim().is_empty(),
    "auth.credentials_path must not be empty"
  );

  Ok(())
}
