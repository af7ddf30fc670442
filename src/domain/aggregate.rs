//! KPI and grouped-series computation over a (filtered) ledger.
//!
//! Pure functions of their inputs. An empty ledger is a valid input
//! and produces zero totals, absent extremes and empty series.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::ledger::TradeRecord;

/// Summary numbers plus grouped series for one ledger selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiSet {
    /// Number of rows aggregated.
    pub row_count: usize,
    /// Σ invested.
    pub total_invested: Decimal,
    /// Σ absolute profit.
    pub total_profit: Decimal,
    /// total_profit / capital × 100, or 0 when nothing was invested.
    pub avg_percentage: Decimal,
    /// Largest single-trade profit; `None` when not available.
    pub max_trade: Option<Decimal>,
    /// Smallest single-trade profit; `None` when not available.
    pub min_trade: Option<Decimal>,
    /// Profit by exit month, ascending.
    pub monthly: Vec<MonthlyProfit>,
    /// Profit by instrument, ascending.
    pub by_instrument: Vec<InstrumentProfit>,
    /// Row counts per strategy.
    pub strategy_distribution: Vec<CategoryCount>,
    /// Row counts per platform.
    pub platform_distribution: Vec<CategoryCount>,
}

/// Profit realised in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyProfit {
    /// `YYYY-MM`.
    pub month: String,
    pub profit: Decimal,
}

/// Profit and mean percentage return for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentProfit {
    pub instrument: String,
    pub total_profit: Decimal,
    /// Mean of the non-blank percentage cells; `None` if all were blank.
    pub avg_profit_pct: Option<Decimal>,
    pub trades: usize,
}

/// Number of rows carrying one categorical value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Aggregate a ledger selection against a fixed capital base.
///
/// The percentage guard checks turnover, not capital: with nothing
/// invested the percentage is reported as zero whatever the profit.
/// A zero capital (rejected by config validation) also yields zero,
/// as does a percentage too large to represent. Totals cannot overflow
/// for ledgers built by `Ledger::from_table`.
pub fn aggregate(trades: &[TradeRecord], capital: Decimal, day_first: bool) -> KpiSet {
    let total_invested: Decimal = trades.iter().filter_map(|t| t.invested).sum();
    let total_profit: Decimal = trades.iter().filter_map(|t| t.profit_abs).sum();

    let avg_percentage = if total_invested.is_zero() {
        Decimal::ZERO
    } else {
        total_profit
            .checked_div(capital)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or_default()
    };

    let max_trade = trades.iter().filter_map(|t| t.profit_abs).max();
    let min_trade = trades.iter().filter_map(|t| t.profit_abs).min();

    KpiSet {
        row_count: trades.len(),
        total_invested,
        total_profit,
        avg_percentage,
        max_trade,
        min_trade,
        monthly: monthly_profit(trades, day_first),
        by_instrument: instrument_profit(trades),
        strategy_distribution: distribution(trades.iter().map(|t| t.strategy.as_str())),
        platform_distribution: distribution(trades.iter().map(|t| t.platform.as_str())),
    }
}

/// Sum profit per exit month; rows with unparseable exit dates are skipped.
pub fn monthly_profit(trades: &[TradeRecord], day_first: bool) -> Vec<MonthlyProfit> {
    let mut months: BTreeMap<String, Decimal> = BTreeMap::new();

    for trade in trades {
        let Some(exit) = trade.exit_on(day_first) else {
            continue;
        };
        *months.entry(exit.format("%Y-%m").to_string()).or_default() +=
            trade.profit_abs.unwrap_or_default();
    }

    months
        .into_iter()
        .map(|(month, profit)| MonthlyProfit { month, profit })
        .collect()
}

/// Sum profit and average percentage per instrument, ascending by name.
pub fn instrument_profit(trades: &[TradeRecord]) -> Vec<InstrumentProfit> {
    #[derive(Default)]
    struct Acc {
        profit: Decimal,
        pct_sum: Decimal,
        pct_n: u32,
        trades: usize,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for trade in trades {
        let acc = groups.entry(trade.instrument.as_str()).or_default();
        acc.profit += trade.profit_abs.unwrap_or_default();
        acc.trades += 1;
        if let Some(pct) = trade.profit_pct {
            acc.pct_sum += pct;
            acc.pct_n += 1;
        }
    }

    groups
        .into_iter()
        .map(|(instrument, acc)| InstrumentProfit {
            instrument: instrument.to_string(),
            total_profit: acc.profit,
            avg_profit_pct: (acc.pct_n > 0).then(|| acc.pct_sum / Decimal::from(acc.pct_n)),
            trades: acc.trades,
        })
        .collect()
}

/// Count rows per value, most frequent first, ties by label.
pub fn distribution<'a, I>(values: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect();
    // BTreeMap already ordered labels; a stable sort keeps that for ties.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}
