//! CSV Table Source - HTTP or Filesystem Loader
//!
//! Implements the `TableSource` port. `http://` and `https://`
//! locations are fetched with reqwest; anything else is read from
//! disk. Every load is a fresh read: the table is replaced
//! wholesale, never patched.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::parse::parse_csv;
use crate::domain::table::Table;
use crate::error::DeskError;
use crate::ports::table_source::TableSource;

/// Loads CSV tables from URLs or paths.
pub struct CsvTableSource {
  /// Shared HTTP client for remote sheets.
  http: Client,
}

impl CsvTableSource {
  /// Create a source whose remote fetches time out after `timeout`.
  pub fn new(timeout: Duration) -> anyhow::Result<Self> {
    let http = Client::builder()
      .timeout(timeout)
      .pool_max_idle_per_host(2)
      .build()
      .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;
    Ok(Self { http })
  }

  async fn fetch_text(&self, location: &str) -> Result<String, DeskError> {
    if is_remote(location) {
      let response = self
        .http
        .get(location)
        .send()
        .await
        .map_err(|e| DeskError::data_unavailable(location, format!("unreachable: {e}")))?;

      let status = response.status();
      if !status.is_success() {
        return Err(DeskError::data_unavailable(location, format!("HTTP {status}")));
      }

      response
        .text()
        .await
        .map_err(|e| DeskError::data_unavailable(location, format!("unreadable body: {e}")))
    } else {
      tokio::fs::read_to_string(location)
        .await
        .map_err(|e| DeskError::data_unavailable(location, format!("unreadable file: {e}")))
    }
  }
}

#[async_trait]
impl TableSource for CsvTableSource {
  #[instrument(skip(self, required))]
  async fn load(
    &self,
    location: &str,
    required: &'static [&'static str],
  ) -> Result<Table, DeskError> {
    let result = async {
      let text = self.fetch_text(location).await?;
      let table = parse_csv(&text, location)?;
      table.require_columns(location, required)?;
      Ok::<_, DeskError>(table)
    }
    .await;

    match &result {
      Ok(table) => debug!(
        rows = table.len(),
        columns = table.columns.len(),
        "Table loaded"
      ),
      Err(e) => warn!(error = %e, "Table load failed"),
    }

    result
  }
}

fn is_remote(location: &str) -> bool {
  let lower = location.trim_start().to_ascii_lowercase();
  lower.starts_with("http://") || lower.starts_with("https://")
}
