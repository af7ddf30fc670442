//! Trade ledger: typed rows, categorical filtering, cell parsing.
//!
//! The ledger is immutable once built. Filtering returns a new
//! ledger holding the matching rows in source order; nothing is
//! ever edited in place.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::table::{Table, distinct_in_order};
use crate::error::DeskError;

pub const COL_ENTRY_DATE: &str = "ENTRY DATE";
pub const COL_EXIT_DATE: &str = "EXIT DATE";
pub const COL_INSTRUMENT: &str = "SCRIPT";
pub const COL_STRATEGY: &str = "STRATEGY";
pub const COL_PLATFORM: &str = "PLATFORM";
pub const COL_INVESTED: &str = "INVESTED";
pub const COL_PROFIT_ABS: &str = "PROFIT/ABS";
pub const COL_PROFIT_PCT: &str = "PROFIT/%";

/// Columns a trade ledger source must provide.
pub const LEDGER_COLUMNS: [&str; 8] = [
    COL_ENTRY_DATE,
    COL_EXIT_DATE,
    COL_INSTRUMENT,
    COL_STRATEGY,
    COL_PLATFORM,
    COL_INVESTED,
    COL_PROFIT_ABS,
    COL_PROFIT_PCT,
];

/// Wire value meaning "no constraint" for a categorical filter.
pub const ALL: &str = "All";

/// One closed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Entry date as written in the source.
    pub entry_date: String,
    /// Exit date as written in the source.
    pub exit_date: String,
    /// Instrument identifier (ticker / script name).
    pub instrument: String,
    /// Strategy label.
    pub strategy: String,
    /// Broker / platform label.
    pub platform: String,
    /// Amount invested; `None` for a blank cell.
    pub invested: Option<Decimal>,
    /// Absolute profit; `None` for a blank cell.
    pub profit_abs: Option<Decimal>,
    /// Percentage profit; `None` for a blank cell.
    pub profit_pct: Option<Decimal>,
}

impl TradeRecord {
    /// Parsed exit date, if the cell holds a recognisable date.
    pub fn exit_on(&self, day_first: bool) -> Option<NaiveDate> {
        parse_trade_date(&self.exit_date, day_first)
    }
}

/// Optional exact-match constraints on platform and strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub platform: Option<String>,
    pub strategy: Option<String>,
}

impl FilterSelection {
    /// Build from raw choices, mapping absent, blank and `All` to no constraint.
    pub fn from_choices(platform: Option<&str>, strategy: Option<&str>) -> Self {
        Self {
            platform: constraint(platform),
            strategy: constraint(strategy),
        }
    }

    /// Whether neither dimension is constrained.
    pub fn is_unconstrained(&self) -> bool {
        self.platform.is_none() && self.strategy.is_none()
    }
}

/// Normalise one categorical choice: `None`, blank or `All` mean no constraint.
pub fn constraint(choice: Option<&str>) -> Option<String> {
    choice
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != ALL)
        .map(str::to_string)
}

/// Selectable values for the two filter dimensions, each led by `All`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub platforms: Vec<String>,
    pub strategies: Vec<String>,
}

/// Immutable, ordered collection of trade records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    trades: Vec<TradeRecord>,
}

impl Ledger {
    pub fn new(trades: Vec<TradeRecord>) -> Self {
        Self { trades }
    }

    /// Convert a loaded table into typed trades.
    ///
    /// Fails with `DataUnavailable` if a required column is missing, an
    /// amount cell is neither blank nor numeric, or an amount column is
    /// too large to total (see [`check_magnitudes`]).
    pub fn from_table(table: &Table, source_name: &str) -> Result<Self, DeskError> {
        table.require_columns(source_name, &LEDGER_COLUMNS)?;

        // Presence was just checked, so every lookup succeeds.
        let idx = |name: &str| table.column_index(name).unwrap_or_default();
        let entry = idx(COL_ENTRY_DATE);
        let exit = idx(COL_EXIT_DATE);
        let instrument = idx(COL_INSTRUMENT);
        let strategy = idx(COL_STRATEGY);
        let platform = idx(COL_PLATFORM);
        let invested = idx(COL_INVESTED);
        let profit_abs = idx(COL_PROFIT_ABS);
        let profit_pct = idx(COL_PROFIT_PCT);

        let mut trades = Vec::with_capacity(table.len());
        for (row_no, row) in table.rows.iter().enumerate() {
            let amount = |col: usize, name: &str| {
                parse_amount(&row[col]).map_err(|bad| {
                    // +2: one for the header line, one for 1-based numbering
                    DeskError::data_unavailable(
                        source_name,
                        format!("row {}: column {name} is not a number: {bad:?}", row_no + 2),
                    )
                })
            };

            trades.push(TradeRecord {
                entry_date: row[entry].trim().to_string(),
                exit_date: row[exit].trim().to_string(),
                instrument: row[instrument].trim().to_string(),
                strategy: row[strategy].trim().to_string(),
                platform: row[platform].trim().to_string(),
                invested: amount(invested, COL_INVESTED)?,
                profit_abs: amount(profit_abs, COL_PROFIT_ABS)?,
                profit_pct: amount(profit_pct, COL_PROFIT_PCT)?,
            });
        }

        check_magnitudes(&trades, source_name)?;
        Ok(Self { trades })
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Rows matching every set constraint, in source order.
    pub fn filter(&self, selection: &FilterSelection) -> Self {
        if selection.is_unconstrained() {
            return self.clone();
        }

        let trades = self
            .trades
            .iter()
            .filter(|t| matches(selection.platform.as_deref(), &t.platform))
            .filter(|t| matches(selection.strategy.as_deref(), &t.strategy))
            .cloned()
            .collect();
        Self { trades }
    }

    /// Distinct platforms and strategies observed, each prefixed with `All`.
    pub fn options(&self) -> FilterOptions {
        FilterOptions {
            platforms: with_all(distinct_in_order(self.trades.iter().map(|t| t.platform.as_str()))),
            strategies: with_all(distinct_in_order(self.trades.iter().map(|t| t.strategy.as_str()))),
        }
    }
}

fn matches(constraint: Option<&str>, value: &str) -> bool {
    constraint.is_none_or(|c| c == value)
}

type AmountOf = fn(&TradeRecord) -> Option<Decimal>;

/// Reject amount columns whose absolute total, scaled by 100, does not fit
/// in a `Decimal`.
///
/// Every sum over any subset of rows is then bounded, so aggregation
/// cannot overflow whatever filter is applied.
pub fn check_magnitudes(trades: &[TradeRecord], source_name: &str) -> Result<(), DeskError> {
    let columns: [(&str, AmountOf); 3] = [
        (COL_INVESTED, |t: &TradeRecord| t.invested),
        (COL_PROFIT_ABS, |t: &TradeRecord| t.profit_abs),
        (COL_PROFIT_PCT, |t: &TradeRecord| t.profit_pct),
    ];

    for (name, amount_of) in columns {
        let bounded = trades
            .iter()
            .filter_map(amount_of)
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v.abs()))
            .and_then(|total| total.checked_mul(Decimal::ONE_HUNDRED))
            .is_some();
        if !bounded {
            return Err(DeskError::data_unavailable(
                source_name,
                format!("column {name} total is out of range"),
            ));
        }
    }
    Ok(())
}

/// Prefix a distinct-value list with the `All` choice.
pub fn with_all(values: Vec<String>) -> Vec<String> {
    std::iter::once(ALL.to_string()).chain(values).collect()
}

/// Parse a money or percentage cell.
///
/// Blank and `NaN` cells are missing (`Ok(None)`). Thousands
/// separators, `₹`, `$`, `%` and inner whitespace are ignored.
/// Anything else that fails to parse is returned as `Err(cell)`.
pub fn parse_amount(cell: &str) -> Result<Option<Decimal>, String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ',' | '₹' | '$' | '%') && !c.is_whitespace())
        .collect();

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map(Some)
        .map_err(|_| trimmed.to_string())
}

const DATE_FORMATS: [&str; 6] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%b-%Y", "%d %b %Y", "%b %d, %Y", "%d-%B-%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const MONTH_FIRST: [&str; 2] = ["%m/%d/%Y", "%m-%d-%Y"];
const DAY_FIRST: [&str; 2] = ["%d/%m/%Y", "%d-%m-%Y"];

/// Parse a trade date cell; `None` if no accepted format matches.
///
/// Ambiguous numeric dates (`03/05/2024`) are month-first unless
/// `day_first` is set.
pub fn parse_trade_date(cell: &str, day_first: bool) -> Option<NaiveDate> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }

    let numeric = if day_first { DAY_FIRST } else { MONTH_FIRST };

    DATE_FORMATS
        .iter()
        .chain(numeric.iter())
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn trade(platform: &str, strategy: &str) -> TradeRecord {
        TradeRecord {
            entry_date: "2024-01-02".into(),
            exit_date: "2024-01-10".into(),
            instrument: "TCS".into(),
            strategy: strategy.into(),
            platform: platform.into(),
            invested: Some(dec!(1000)),
            profit_abs: Some(dec!(50)),
            profit_pct: Some(dec!(5)),
        }
    }

    fn ledger() -> Ledger {
        Ledger::new(vec![
            trade("Zerodha", "Swing"),
            trade("Upstox", "Swing"),
            trade("Zerodha", "Positional"),
            trade("Zerodha", "Swing"),
        ])
    }

    #[test]
    fn test_from_choices_all_means_unconstrained() {
        let sel = FilterSelection::from_choices(Some("All"), None);
        assert!(sel.is_unconstrained());
        let sel = FilterSelection::from_choices(Some(" Zerodha "), Some(""));
        assert_eq!(sel.platform.as_deref(), Some("Zerodha"));
        assert!(sel.strategy.is_none());
    }

    #[test]
    fn test_filter_both_dimensions_preserves_order() {
        let sel = FilterSelection::from_choices(Some("Zerodha"), Some("Swing"));
        let out = ledger().filter(&sel);
        assert_eq!(out.len(), 2);
        assert!(out.trades().iter().all(|t| t.platform == "Zerodha" && t.strategy == "Swing"));
        assert_eq!(out.trades()[0], ledger().trades()[0]);
        assert_eq!(out.trades()[1], ledger().trades()[3]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let sel = FilterSelection::from_choices(Some("Upstox"), None);
        let once = ledger().filter(&sel);
        assert_eq!(once.filter(&sel), once);
    }

    #[test]
    fn test_filter_unknown_value_yields_empty() {
        let sel = FilterSelection::from_choices(Some("Groww"), None);
        assert!(ledger().filter(&sel).is_empty());
    }

    #[test]
    fn test_options_first_appearance_with_all() {
        let opts = ledger().options();
        assert_eq!(opts.platforms, vec!["All", "Zerodha", "Upstox"]);
        assert_eq!(opts.strategies, vec!["All", "Swing", "Positional"]);
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("1,25,000.50"), Ok(Some(dec!(125000.50))));
        assert_eq!(parse_amount("₹ -420"), Ok(Some(dec!(-420))));
        assert_eq!(parse_amount("12.5%"), Ok(Some(dec!(12.5))));
        assert_eq!(parse_amount("  "), Ok(None));
        assert_eq!(parse_amount("NaN"), Ok(None));
        assert_eq!(parse_amount("abc"), Err("abc".to_string()));
    }

    #[test]
    fn test_parse_trade_date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_trade_date("2024-03-05", false), Some(d));
        assert_eq!(parse_trade_date("05-Mar-2024", false), Some(d));
        assert_eq!(parse_trade_date("2024-03-05 15:20:00", false), Some(d));
        assert_eq!(parse_trade_date("03/05/2024", false), Some(d));
        assert_eq!(parse_trade_date("05/03/2024", true), Some(d));
        assert_eq!(parse_trade_date("not a date", false), None);
        assert_eq!(parse_trade_date("", false), None);
    }

    #[test]
    fn test_from_table_rejects_amounts_too_large_to_total() {
        let cols: Vec<String> = LEDGER_COLUMNS.iter().map(|c| c.to_string()).collect();
        let row = |profit: &str| -> Vec<String> {
            vec!["2024-01-01", "2024-01-05", "TCS", "Swing", "Zerodha", "100", profit, "1"]
                .into_iter()
                .map(String::from)
                .collect()
        };
        let huge = "79228162514264337593543950335";
        let table = Table::new(cols, vec![row(huge), row(huge)]);

        let err = Ledger::from_table(&table, "trades.csv").unwrap_err();
        assert!(matches!(err, DeskError::DataUnavailable { ref reason, .. } if reason.contains("PROFIT/ABS")));
    }

    #[test]
    fn test_check_magnitudes_accepts_mixed_signs() {
        let mut loss = trade("Zerodha", "Swing");
        loss.profit_abs = Some(Decimal::from(-5_000));
        let mut gain = trade("Upstox", "Swing");
        gain.profit_abs = Some(Decimal::from(12_000));
        assert!(check_magnitudes(&[loss, gain], "trades.csv").is_ok());
    }

    #[test]
    fn test_from_table_rejects_non_numeric_amount() {
        let mut cols: Vec<String> = LEDGER_COLUMNS.iter().map(|c| c.to_string()).collect();
        cols.push("NOTES".into());
        let row = vec!["2024-01-01", "2024-01-05", "TCS", "Swing", "Zerodha", "lots", "10", "1", "x"]
            .into_iter()
            .map(String::from)
            .collect();
        let table = Table::new(cols, vec![row]);
        let err = Ledger::from_table(&table, "trades.csv").unwrap_err();
        assert!(matches!(err, DeskError::DataUnavailable { ref reason, .. } if reason.contains("row 2") && reason.contains("INVESTED")));
    }
}
