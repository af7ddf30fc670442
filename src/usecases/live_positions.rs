//! Live Positions - Open Holdings View
//!
//! Same load → filter → summarize pass as the dashboard, over the
//! live-positions sheet.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::DataConfig;
use crate::domain::positions::{LIVE_COLUMNS, LivePositionBook, LiveSelection, LiveSummary};
use crate::domain::table::Table;
use crate::error::DeskError;
use crate::ports::table_source::TableSource;

/// Everything the live-positions page renders for one selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveView {
  pub market_cap_options: Vec<String>,
  pub strategy_options: Vec<String>,
  pub selection: LiveSelection,
  pub summary: LiveSummary,
  /// Filtered rows with every source column, in source order.
  pub table: Table,
  pub empty: bool,
}

/// Builds live-position views from a tabular source.
pub struct LivePositionsService<S: TableSource> {
  source: Arc<S>,
  location: String,
}

impl<S: TableSource> LivePositionsService<S> {
  pub fn new(source: Arc<S>, data: &DataConfig) -> Self {
    Self {
      source,
      location: data.live_positions_location.clone(),
    }
  }

  /// Load, filter and summarize for one selection.
  #[instrument(skip(self), fields(location = %self.location))]
  pub async fn view(&self, selection: &LiveSelection) -> Result<LiveView, DeskError> {
    let table = self.source.load(&self.location, &LIVE_COLUMNS).await?;
    let book = LivePositionBook::from_table(table, &self.location)?;
    let view = build_live_view(&book, selection);
    debug!(
      rows = book.table().len(),
      matched = view.summary.row_count,
      "Live view computed"
    );
    Ok(view)
  }
}

/// Pure part of [`LivePositionsService::view`].
pub fn build_live_view(book: &LivePositionBook, selection: &LiveSelection) -> LiveView {
  let (market_cap_options, strategy_options) = book.options();
  let subset = book.filter(selection);
  LiveView {
    market_cap_options,
    strategy_options,
    selection: selection.clone(),
    summary: subset.summary(),
    empty: subset.table().is_empty(),
    table: subset.table().clone(),
  }
}
