//! Property-Based Tests - Domain Layer Invariants
//!
//! Uses `proptest` to check that filtering, aggregation and context
//! building keep their invariants across random ledgers and
//! transcripts.

use proptest::prelude::*;
use rust_decimal::Decimal;

use ledger_desk::domain::aggregate::aggregate;
use ledger_desk::domain::chat::{
    CONTEXT_TURNS, Role, TURN_CHAR_LIMIT, Transcript, build_request_context, truncate_chars,
};
use ledger_desk::domain::ledger::{FilterSelection, Ledger, TradeRecord, parse_trade_date};

const PLATFORMS: [&str; 3] = ["Zerodha", "Upstox", "Groww"];
const STRATEGIES: [&str; 3] = ["Swing", "Momentum", "Positional"];
const INSTRUMENTS: [&str; 4] = ["TCS", "INFY", "IRCTC", "SUZLON"];

fn money() -> impl Strategy<Value = Option<Decimal>> {
    prop::option::weighted(0.9, (-5_000_000i64..5_000_000).prop_map(|n| Decimal::new(n, 2)))
}

fn exit_date() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (2022u32..2025, 1u32..13, 1u32..29)
            .prop_map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}")),
        1 => Just(String::new()),
        1 => Just("pending".to_string()),
    ]
}

fn trade() -> impl Strategy<Value = TradeRecord> {
    (
        0..PLATFORMS.len(),
        0..STRATEGIES.len(),
        0..INSTRUMENTS.len(),
        exit_date(),
        money(),
        money(),
        money(),
    )
        .prop_map(|(p, s, i, exit, invested, profit_abs, profit_pct)| TradeRecord {
            entry_date: "2022-01-01".into(),
            exit_date: exit,
            instrument: INSTRUMENTS[i].into(),
            strategy: STRATEGIES[s].into(),
            platform: PLATFORMS[p].into(),
            invested,
            profit_abs,
            profit_pct,
        })
}

fn ledger() -> impl Strategy<Value = Ledger> {
    prop::collection::vec(trade(), 0..60).prop_map(Ledger::new)
}

fn choice(values: &'static [&'static str]) -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        Just(None::<&'static str>),
        Just(Some("All")),
        prop::sample::select(values).prop_map(Some),
    ]
}

fn selection() -> impl Strategy<Value = FilterSelection> {
    (choice(&PLATFORMS), choice(&STRATEGIES))
        .prop_map(|(p, s)| FilterSelection::from_choices(p, s))
}

fn capital() -> Decimal {
    Decimal::from(900_000)
}

// ── Filter Properties ───────────────────────────────────────

proptest! {
    /// ("All", "All") returns the ledger unchanged.
    #[test]
    fn all_all_filter_is_identity(l in ledger()) {
        let sel = FilterSelection::from_choices(Some("All"), Some("All"));
        prop_assert_eq!(l.filter(&sel), l);
    }

    /// Applying the same filter twice changes nothing.
    #[test]
    fn filter_is_idempotent(l in ledger(), sel in selection()) {
        let once = l.filter(&sel);
        prop_assert_eq!(once.filter(&sel), once);
    }

    /// Every kept row matches, and kept rows appear in source order.
    #[test]
    fn filter_keeps_matching_rows_in_order(l in ledger(), sel in selection()) {
        let out = l.filter(&sel);
        for t in out.trades() {
            prop_assert!(sel.platform.as_deref().is_none_or(|p| p == t.platform));
            prop_assert!(sel.strategy.as_deref().is_none_or(|s| s == t.strategy));
        }

        let mut source = l.trades().iter();
        for kept in out.trades() {
            prop_assert!(source.any(|t| t == kept), "kept rows must be a subsequence");
        }
    }
}

// ── Aggregation Properties ──────────────────────────────────

proptest! {
    /// Same (ledger, selection) always gives the same KPIs.
    #[test]
    fn aggregate_is_deterministic(l in ledger(), sel in selection()) {
        let a = aggregate(l.filter(&sel).trades(), capital(), false);
        let b = aggregate(l.filter(&sel).trades(), capital(), false);
        prop_assert_eq!(a, b);
    }

    /// Monthly series sums to the profit of rows with a parseable exit date.
    #[test]
    fn monthly_series_sums_to_dated_profit(l in ledger()) {
        let kpis = aggregate(l.trades(), capital(), false);
        let monthly_sum: Decimal = kpis.monthly.iter().map(|m| m.profit).sum();
        let dated: Decimal = l
            .trades()
            .iter()
            .filter(|t| parse_trade_date(&t.exit_date, false).is_some())
            .filter_map(|t| t.profit_abs)
            .sum();
        prop_assert_eq!(monthly_sum, dated);

        let keys: Vec<&String> = kpis.monthly.iter().map(|m| &m.month).collect();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]), "months must ascend");
    }

    /// max ≥ min whenever any profit is present; both absent otherwise.
    #[test]
    fn extremes_are_ordered(l in ledger(), sel in selection()) {
        let subset = l.filter(&sel);
        let kpis = aggregate(subset.trades(), capital(), false);
        match (kpis.max_trade, kpis.min_trade) {
            (Some(max), Some(min)) => prop_assert!(max >= min),
            (None, None) => prop_assert!(subset.trades().iter().all(|t| t.profit_abs.is_none())),
            other => prop_assert!(false, "extremes must be both present or both absent: {other:?}"),
        }
    }

    /// Instrument totals add up to total profit.
    #[test]
    fn instrument_series_sums_to_total(l in ledger()) {
        let kpis = aggregate(l.trades(), capital(), false);
        let by_instrument: Decimal = kpis.by_instrument.iter().map(|i| i.total_profit).sum();
        prop_assert_eq!(by_instrument, kpis.total_profit);
        prop_assert_eq!(kpis.row_count, l.len());
    }
}

// ── Chat Context Properties ─────────────────────────────────

proptest! {
    /// Context = system block + at most three prior turns + the question.
    #[test]
    fn context_length_is_bounded(n in 0usize..40) {
        let mut transcript = Transcript::new();
        for i in 0..n {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            transcript.append(role, format!("turn {i}")).unwrap();
        }
        let ctx = build_request_context(&transcript, "Analyze TCS");
        prop_assert_eq!(ctx.len(), n.min(CONTEXT_TURNS) + 2);
        prop_assert_eq!(ctx[0].role, Role::System);
        prop_assert_eq!(ctx.last().map(|m| m.content.as_str()), Some("Analyze TCS"));
    }

    /// Truncation yields a character prefix of at most the limit.
    #[test]
    fn truncation_is_a_bounded_prefix(text in "\\PC{0,1200}") {
        let cut = truncate_chars(&text, TURN_CHAR_LIMIT);
        prop_assert!(cut.chars().count() <= TURN_CHAR_LIMIT);
        prop_assert!(text.starts_with(&cut));
        if text.chars().count() <= TURN_CHAR_LIMIT {
            prop_assert_eq!(cut, text);
        }
    }
}
