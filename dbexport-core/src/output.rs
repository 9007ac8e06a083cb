//! CSV rendering and file output.
//!
//! Files use minimal quoting (fields containing a comma, quote, CR or LF are
//! quoted, quotes doubled) and CRLF record terminators. SQL `NULL` becomes an
//! empty field.

use crate::error::DbExportError;
use crate::models::TableData;
use crate::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name for a table's export.
///
/// Path separators and NUL are replaced so the file always lands directly in
/// the output directory.
pub fn csv_file_name(table: &str) -> String {
    let safe: String = table
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();
    format!("{}.csv", safe)
}

/// Full path of a table's export inside `output_dir`.
pub fn csv_path(output_dir: &Path, table: &str) -> PathBuf {
    output_dir.join(csv_file_name(table))
}

/// Writes the header and all rows of `table` as CSV into `writer`.
///
/// # Errors
/// Returns a CSV error if a row's width differs from the header or the
/// writer fails
pub fn write_csv<W: Write>(writer: W, table: &TableData) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    wtr.write_record(&table.columns)
        .map_err(|e| DbExportError::csv(&table.table_name, e))?;

    for row in &table.rows {
        wtr.write_record(row.iter().map(|value| value.as_deref().unwrap_or("")))
            .map_err(|e| DbExportError::csv(&table.table_name, e))?;
    }

    wtr.flush()
        .map_err(|e| DbExportError::csv(&table.table_name, e.into()))?;
    Ok(())
}

/// Renders `table` as CSV text in memory.
///
/// # Errors
/// See [`write_csv`]
pub fn render_csv(table: &TableData) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, table)?;
    Ok(buffer)
}

/// Writes `table` to `path`, replacing any existing file.
///
/// # Errors
/// Returns a CSV error if encoding fails or an I/O error if the file cannot
/// be written
pub async fn save_csv(table: &TableData, path: &Path) -> Result<()> {
    let data = render_csv(table)?;

    tokio::fs::write(path, data)
        .await
        .map_err(|e| DbExportError::io("write", path, e))?;
    Ok(())
}
