//! CSV Source Tests - File-Backed Loading
//!
//! Drives the real `CsvTableSource` against temporary files and
//! through the dashboard and live-positions use cases.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use tempfile::NamedTempFile;

use ledger_desk::adapters::csv::CsvTableSource;
use ledger_desk::config::DataConfig;
use ledger_desk::domain::ledger::{FilterSelection, LEDGER_COLUMNS};
use ledger_desk::domain::positions::LiveSelection;
use ledger_desk::error::DeskError;
use ledger_desk::ports::table_source::TableSource;
use ledger_desk::usecases::{DashboardService, LivePositionsService};

const LEDGER_CSV: &str = "\
ENTRY DATE , EXIT DATE,SCRIPT,STRATEGY,PLATFORM,INVESTED,PROFIT/ABS,PROFIT/%
2024-01-03,19-Jan-2024,TCS,Swing,Zerodha,\"₹1,00,000\",\"₹4,200\",4.2%
2024-01-10,02/02/2024,INFY,Momentum,Upstox,50000,-1500,-3
2024-02-05,2024-02-21 15:30:00,TCS,Swing,Zerodha,75000,2250,3
2024-03-01,,IRCTC,Momentum,Upstox,40000,,
";

const LIVE_CSV: &str = "\
Stock,Market Cap,Strategy Name,broker,Gain
TCS,Large,Swing,Zerodha,3.95
IRCTC,Mid,Momentum,Upstox,-4.32
";

fn temp_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn source() -> Arc<CsvTableSource> {
    Arc::new(CsvTableSource::new(Duration::from_secs(2)).unwrap())
}

fn data_config(ledger: &NamedTempFile, live: &NamedTempFile) -> DataConfig {
    DataConfig {
        ledger_location: ledger.path().to_string_lossy().into_owned(),
        live_positions_location: live.path().to_string_lossy().into_owned(),
        capital: dec!(900000),
        day_first: false,
        fetch_timeout_seconds: 2,
    }
}

#[tokio::test]
async fn test_headers_are_trimmed_before_column_check() {
    let file = temp_csv(LEDGER_CSV);
    let table = source()
        .load(&file.path().to_string_lossy(), &LEDGER_COLUMNS)
        .await
        .unwrap();
    assert_eq!(table.columns[0], "ENTRY DATE");
    assert_eq!(table.len(), 4);
}

#[tokio::test]
async fn test_missing_required_column_is_data_unavailable() {
    let file = temp_csv("ENTRY DATE,EXIT DATE,SCRIPT\n2024-01-01,2024-01-02,TCS\n");
    let err = source()
        .load(&file.path().to_string_lossy(), &LEDGER_COLUMNS)
        .await
        .unwrap_err();
    match err {
        DeskError::DataUnavailable { reason, .. } => assert!(reason.contains("STRATEGY")),
        other => panic!("expected DataUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dashboard_over_real_file() {
    let ledger = temp_csv(LEDGER_CSV);
    let live = temp_csv(LIVE_CSV);
    let service = DashboardService::new(source(), &data_config(&ledger, &live));

    let view = service.view(&FilterSelection::default()).await.unwrap();
    assert_eq!(view.kpis.row_count, 4);
    assert_eq!(view.kpis.total_invested, dec!(265000));
    assert_eq!(view.kpis.total_profit, dec!(4950));

    let months: Vec<&str> = view.kpis.monthly.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02"]);
    assert_eq!(view.kpis.monthly[1].profit, dec!(750));
}

#[tokio::test]
async fn test_day_first_changes_monthly_bucket() {
    let ledger = temp_csv(
        "ENTRY DATE,EXIT DATE,SCRIPT,STRATEGY,PLATFORM,INVESTED,PROFIT/ABS,PROFIT/%\n\
         01/02/2024,03/04/2024,TCS,Swing,Zerodha,1000,10,1\n",
    );
    let live = temp_csv(LIVE_CSV);
    let mut config = data_config(&ledger, &live);

    let month_first = DashboardService::new(source(), &config)
        .view(&FilterSelection::default())
        .await
        .unwrap();
    assert_eq!(month_first.kpis.monthly[0].month, "2024-03");

    config.day_first = true;
    let day_first = DashboardService::new(source(), &config)
        .view(&FilterSelection::default())
        .await
        .unwrap();
    assert_eq!(day_first.kpis.monthly[0].month, "2024-04");
}

#[tokio::test]
async fn test_live_positions_over_real_file() {
    let ledger = temp_csv(LEDGER_CSV);
    let live = temp_csv(LIVE_CSV);
    let service = LivePositionsService::new(source(), &data_config(&ledger, &live));

    let view = service.view(&LiveSelection::default()).await.unwrap();
    assert_eq!(view.summary.top_gainer, Some(dec!(3.95)));
    assert_eq!(view.summary.top_loser, Some(dec!(-4.32)));
    assert_eq!(view.table.columns.len(), 5);
}
