//! Dashboard - Ledger KPI View
//!
//! One request is one pass:
//! - Load a fresh ledger from the configured source
//! - Derive filter options from the unfiltered ledger
//! - Apply the (platform, strategy) selection
//! - Aggregate KPIs and grouped series over the subset

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::DataConfig;
use crate::domain::aggregate::{KpiSet, aggregate};
use crate::domain::ledger::{FilterOptions, FilterSelection, LEDGER_COLUMNS, Ledger, TradeRecord};
use crate::error::DeskError;
use crate::ports::table_source::TableSource;

/// Everything the dashboard page renders for one selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
  /// Choices for the two filter widgets, each led by `All`.
  pub options: FilterOptions,
  /// Selection the view was computed for.
  pub selection: FilterSelection,
  /// KPIs and grouped series over the filtered rows.
  pub kpis: KpiSet,
  /// Filtered rows in source order.
  pub trades: Vec<TradeRecord>,
  /// No row matched the selection.
  pub empty: bool,
}

/// Builds dashboard views from a tabular source.
pub struct DashboardService<S: TableSource> {
  source: Arc<S>,
  location: String,
  capital: Decimal,
  day_first: bool,
}

impl<S: TableSource> DashboardService<S> {
  /// Create a dashboard service over the `[data]` ledger location.
  pub fn new(source: Arc<S>, data: &DataConfig) -> Self {
    Self {
      source,
      location: data.ledger_location.clone(),
      capital: data.capital,
      day_first: data.day_first,
    }
  }

  /// Load a fresh, typed ledger.
  #[instrument(skip(self), fields(location = %self.location))]
  pub async fn load_ledger(&self) -> Result<Ledger, DeskError> {
    let table = self.source.load(&self.location, &LEDGER_COLUMNS).await?;
    Ledger::from_table(&table, &self.location)
  }

  /// Load, filter and aggregate for one selection.
  #[instrument(skip(self))]
  pub async fn view(&self, selection: &FilterSelection) -> Result<DashboardView, DeskError> {
    let ledger = self.load_ledger().await?;
    let view = build_view(&ledger, selection, self.capital, self.day_first);
    debug!(
      rows = ledger.len(),
      matched = view.kpis.row_count,
      "Dashboard view computed"
    );
    Ok(view)
  }
}

/// Pure part of [`DashboardService::view`].
pub fn build_view(
  ledger: &Ledger,
  selection: &FilterSelection,
  capital: Decimal,
  day_first: bool,
) -> DashboardView {
  let subset = ledger.filter(selection);
  let kpis = aggregate(subset.trades(), capital, day_first);
  DashboardView {
    options: ledger.options(),
    selection: selection.clone(),
    empty: subset.is_empty(),
    trades: subset.trades().to_vec(),
    kpis,
  }
}
