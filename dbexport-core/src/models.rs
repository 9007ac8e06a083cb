//! Data carried through one export run.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Full contents of one table, materialized in memory.
///
/// Each cell holds the value's PostgreSQL text representation, `None` for SQL
/// `NULL`. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    pub table_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl TableData {
    /// Creates an empty row set with the given header.
    pub fn new(table_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of data rows (the header is not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Outcome of exporting one table.
#[derive(Debug, Clone)]
pub struct ExportedTable {
    pub table_name: String,
    pub path: PathBuf,
    pub row_count: usize,
    pub column_count: usize,
}

/// Outcome of a complete run, tables in export order.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub tables: Vec<ExportedTable>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExportSummary {
    /// Total data rows written across all files.
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.row_count).sum()
    }

    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.signed_duration_since(self.started_at)
    }
}
