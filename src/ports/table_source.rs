//! Table Source Port - Tabular Data Loading Interface
//!
//! Defines the trait for fetching a CSV table from a URL or a path.
//! The domain never sees transport details: it receives a `Table`
//! or a `DataUnavailable` error.

use async_trait::async_trait;

use crate::domain::table::Table;
use crate::error::DeskError;

/// Trait for tabular data providers.
///
/// Implementors resolve `location` (an `http(s)://` URL or a
/// filesystem path), decode it as CSV and check that every name in
/// `required` is present in the header row. Every failure, including
/// a missing column, is reported as `DeskError::DataUnavailable`.
#[async_trait]
pub trait TableSource: Send + Sync + 'static {
  /// Load a fresh copy of the table at `location`.
  async fn load(
    &self,
    location: &str,
    required: &'static [&'static str],
  ) -> Result<Table, DeskError>;
}
