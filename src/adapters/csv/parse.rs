//! CSV text → `Table` decoding.

use csv::{ReaderBuilder, Trim};

use crate::domain::table::Table;
use crate::error::DeskError;

/// Decode CSV text into a table, tolerating ragged rows.
///
/// A leading UTF-8 BOM is dropped and blank lines are skipped.
/// Short rows are padded. A row with a non-blank cell past the last
/// header column, or text with no header row, is `DataUnavailable`.
pub fn parse_csv(text: &str, source_name: &str) -> Result<Table, DeskError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| DeskError::data_unavailable(source_name, format!("unreadable header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    if columns.iter().all(|c| c.is_empty()) {
        return Err(DeskError::data_unavailable(source_name, "no header row"));
    }

    let width = columns.len();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| DeskError::data_unavailable(source_name, format!("malformed CSV: {e}")))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        if record.iter().skip(width).any(|cell| !cell.trim().is_empty()) {
            let line = record.position().map_or(0, csv::Position::line);
            return Err(DeskError::data_unavailable(
                source_name,
                format!("line {line}: expected {width} fields, saw {}", record.len()),
            ));
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::new(columns, rows))
}
