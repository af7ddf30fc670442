//! CSV Data Source Adapter
//!
//! Implements the `TableSource` port for CSV sheets published at a
//! URL (e.g. a spreadsheet's CSV export link) or stored on disk.
//!
//! Sub-modules:
//! - `parse`: CSV text decoding into a `Table`
//! - `source`: URL / path resolution and loading

pub mod parse;
pub mod source;

pub use source::CsvTableSource;
