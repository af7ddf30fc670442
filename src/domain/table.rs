//! Raw tabular data as loaded from a CSV source.
//!
//! A `Table` is the untyped form every view starts from: header
//! names plus rows of string cells, in source order. Typed views
//! (`Ledger`, `LivePositionBook`) are built from it.

use serde::Serialize;

use crate::error::DeskError;

/// Header names plus rows of cells, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Column names, trimmed.
    pub columns: Vec<String>,
    /// Row cells; every row has `columns.len()` cells.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, trimming header names and padding short rows.
    ///
    /// Cells past the header width are dropped; `parse_csv` refuses
    /// rows where any such cell is non-blank.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns: Vec<String> = columns.into_iter().map(|c| c.trim().to_string()).collect();
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Position of a column by exact (trimmed) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Fail with `DataUnavailable` listing every required column that is absent.
    pub fn require_columns(&self, source_name: &str, required: &[&str]) -> Result<(), DeskError> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| self.column_index(name).is_none())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DeskError::data_unavailable(
                source_name,
                format!("missing required columns: {}", missing.join(", ")),
            ))
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Distinct values in first-appearance order.
pub fn distinct_in_order<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}
