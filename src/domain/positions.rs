//! Live (open) positions view.
//!
//! Unlike the ledger, the live sheet is displayed with all of its
//! columns, so rows stay untyped. Only the filter columns and the
//! optional `Gain` column are interpreted.

use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregate::{CategoryCount, distribution};
use super::ledger::{constraint, parse_amount, with_all};
use super::table::{Table, distinct_in_order};
use crate::error::DeskError;

pub const COL_MARKET_CAP: &str = "Market Cap";
pub const COL_STRATEGY_NAME: &str = "Strategy Name";
pub const COL_BROKER: &str = "broker";
pub const COL_GAIN: &str = "Gain";

/// Columns a live-positions source must provide. `Gain` is optional.
pub const LIVE_COLUMNS: [&str; 3] = [COL_MARKET_CAP, COL_STRATEGY_NAME, COL_BROKER];

/// Exact-match constraints for the live view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LiveSelection {
    pub market_cap: Option<String>,
    pub strategy: Option<String>,
}

impl LiveSelection {
    pub fn from_choices(market_cap: Option<&str>, strategy: Option<&str>) -> Self {
        Self {
            market_cap: constraint(market_cap),
            strategy: constraint(strategy),
        }
    }
}

/// Headline numbers and distributions for the live view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveSummary {
    pub row_count: usize,
    /// Highest `Gain`; `None` if the column is absent or has no numeric cell.
    pub top_gainer: Option<Decimal>,
    /// Lowest `Gain`; same availability rule as `top_gainer`.
    pub top_loser: Option<Decimal>,
    pub strategy_distribution: Vec<CategoryCount>,
    pub market_cap_distribution: Vec<CategoryCount>,
    pub broker_distribution: Vec<CategoryCount>,
}

/// Loaded live-positions sheet with resolved column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivePositionBook {
    table: Table,
    market_cap: usize,
    strategy: usize,
    broker: usize,
    gain: Option<usize>,
}

impl LivePositionBook {
    pub fn from_table(table: Table, source_name: &str) -> Result<Self, DeskError> {
        table.require_columns(source_name, &LIVE_COLUMNS)?;
        let idx = |name: &str| table.column_index(name).unwrap_or_default();
        Ok(Self {
            market_cap: idx(COL_MARKET_CAP),
            strategy: idx(COL_STRATEGY_NAME),
            broker: idx(COL_BROKER),
            gain: table.column_index(COL_GAIN),
            table,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Rows matching the selection, in source order.
    pub fn filter(&self, selection: &LiveSelection) -> Self {
        let keep = |row: &Vec<String>| {
            selection
                .market_cap
                .as_deref()
                .is_none_or(|m| row[self.market_cap].trim() == m)
                && selection
                    .strategy
                    .as_deref()
                    .is_none_or(|s| row[self.strategy].trim() == s)
        };

        let rows = self.table.rows.iter().filter(|&r| keep(r)).cloned().collect();
        Self {
            table: Table {
                columns: self.table.columns.clone(),
                rows,
            },
            ..*self
        }
    }

    /// Market-cap choices and strategy choices, each led by `All`.
    pub fn options(&self) -> (Vec<String>, Vec<String>) {
        (
            with_all(distinct_in_order(self.column(self.market_cap))),
            with_all(distinct_in_order(self.column(self.strategy))),
        )
    }

    pub fn summary(&self) -> LiveSummary {
        // Coercing conversion: cells that are not numbers count as missing.
        let gains: Vec<Decimal> = self
            .gain
            .map(|g| {
                self.table
                    .rows
                    .iter()
                    .filter_map(|row| parse_amount(&row[g]).ok().flatten())
                    .collect()
            })
            .unwrap_or_default();

        LiveSummary {
            row_count: self.table.len(),
            top_gainer: gains.iter().max().copied(),
            top_loser: gains.iter().min().copied(),
            strategy_distribution: distribution(self.column(self.strategy)),
            market_cap_distribution: distribution(self.column(self.market_cap)),
            broker_distribution: distribution(self.column(self.broker)),
        }
    }

    fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.table.rows.iter().map(move |row| row[idx].trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book(with_gain: bool) -> LivePositionBook {
        let mut columns = vec!["Stock", "Market Cap", "Strategy Name", "broker"];
        if with_gain {
            columns.push("Gain");
        }
        let rows = [
            ["RELIANCE", "Large", "Swing", "Zerodha", "4.5"],
            ["IRCTC", "Mid", "Swing", "Upstox", "-2.25"],
            ["TATAELXSI", "Mid", "Positional", "Zerodha", "n/a"],
            ["HDFCBANK", "Large", "Positional", "Zerodha", "1.0"],
        ];
        let rows = rows
            .iter()
            .map(|r| r[..columns.len()].iter().map(|c| c.to_string()).collect())
            .collect();
        let table = Table::new(columns.into_iter().map(String::from).collect(), rows);
        LivePositionBook::from_table(table, "live.csv").unwrap()
    }

    #[test]
    fn test_missing_required_column_is_data_unavailable() {
        let table = Table::new(vec!["Market Cap".into(), "broker".into()], vec![]);
        let err = LivePositionBook::from_table(table, "live.csv").unwrap_err();
        assert!(matches!(err, DeskError::DataUnavailable { .. }));
    }

    #[test]
    fn test_summary_skips_non_numeric_gain() {
        let s = book(true).summary();
        assert_eq!(s.row_count, 4);
        assert_eq!(s.top_gainer, Some(dec!(4.5)));
        assert_eq!(s.top_loser, Some(dec!(-2.25)));
        assert_eq!(s.broker_distribution[0].label, "Zerodha");
        assert_eq!(s.broker_distribution[0].count, 3);
    }

    #[test]
    fn test_summary_without_gain_column() {
        let s = book(false).summary();
        assert!(s.top_gainer.is_none());
        assert!(s.top_loser.is_none());
    }

    #[test]
    fn test_filter_and_options() {
        let b = book(true);
        let (caps, strategies) = b.options();
        assert_eq!(caps, vec!["All", "Large", "Mid"]);
        assert_eq!(strategies, vec!["All", "Swing", "Positional"]);

        let mid = b.filter(&LiveSelection::from_choices(Some("Mid"), Some("All")));
        assert_eq!(mid.table().len(), 2);
        assert_eq!(mid.table().rows[0][0], "IRCTC");
        assert_eq!(mid.table().columns, b.table().columns);
    }
}
