//! The export pipeline: enumerate, then fetch and write each table in order.
//!
//! The first failure stops the run. Files already written stay in place and
//! the remaining tables are skipped.

use crate::config::ExportConfig;
use crate::error::DbExportError;
use crate::models::{ExportSummary, ExportedTable};
use crate::output::{csv_path, save_csv};
use crate::source::TableSource;
use crate::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Exports every table of `config.schema` to `config.output_dir`.
///
/// The output directory is created (if missing) before anything else is
/// done with the source. `on_exported` runs after each file is written, in
/// export order.
///
/// # Errors
/// Returns the first enumeration, query, encoding, or I/O error encountered,
/// or a configuration error if two tables would be written to the same file
pub async fn export_tables<S, F>(
    source: &mut S,
    config: &ExportConfig,
    mut on_exported: F,
) -> Result<ExportSummary>
where
    S: TableSource + ?Sized,
    F: FnMut(&ExportedTable),
{
    let started_at = chrono::Utc::now();
    let output_dir = config.output_dir.as_path();

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| DbExportError::io("create directory", output_dir, e))?;

    let tables = source.list_tables(&config.schema).await?;
    tracing::info!(
        "Found {} tables in schema '{}'",
        tables.len(),
        config.schema
    );

    let paths = planned_paths(output_dir, &tables)?;
    let mut exported = Vec::with_capacity(tables.len());

    for (table, path) in tables.iter().zip(paths) {
        let data = source.fetch_table(&config.schema, table).await?;
        save_csv(&data, &path).await?;

        let record = ExportedTable {
            table_name: table.clone(),
            path,
            row_count: data.row_count(),
            column_count: data.columns.len(),
        };
        tracing::info!(
            "Exported {} rows x {} columns from '{}' to {}",
            record.row_count,
            record.column_count,
            record.table_name,
            record.path.display()
        );

        on_exported(&record);
        exported.push(record);
    }

    Ok(ExportSummary {
        tables: exported,
        started_at,
        finished_at: chrono::Utc::now(),
    })
}

/// Output file of every table, in order.
///
/// Two names that only differ in a replaced path separator (`a/b`, `a_b`)
/// would share a file, so that is rejected before anything is fetched.
fn planned_paths(output_dir: &Path, tables: &[String]) -> Result<Vec<PathBuf>> {
    let mut claimed: HashMap<PathBuf, &str> = HashMap::with_capacity(tables.len());

    tables
        .iter()
        .map(|table| {
            let path = csv_path(output_dir, table);
            if let Some(other) = claimed.insert(path.clone(), table) {
                return Err(DbExportError::configuration(format!(
                    "tables '{}' and '{}' would both be written to {}",
                    other,
                    table,
                    path.display()
                )));
            }
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::TableData;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    /// In-memory source; tables are listed in name order like the catalog query.
    #[derive(Default)]
    struct MemorySource {
        tables: BTreeMap<String, TableData>,
        fail_on: Option<String>,
        fetched: Vec<String>,
    }

    impl MemorySource {
        fn with_table(mut self, name: &str, columns: &[&str], rows: &[&[Option<&str>]]) -> Self {
            let mut data = TableData::new(name, columns.iter().map(|c| c.to_string()).collect());
            data.rows = rows
                .iter()
                .map(|row| row.iter().map(|v| v.map(str::to_string)).collect())
                .collect();
            self.tables.insert(name.to_string(), data);
            self
        }
    }

    #[async_trait]
    impl TableSource for MemorySource {
        async fn list_tables(&mut self, _schema: &str) -> Result<Vec<String>> {
            Ok(self.tables.keys().cloned().collect())
        }

        async fn fetch_table(&mut self, _schema: &str, table: &str) -> Result<TableData> {
            self.fetched.push(table.to_string());
            if self.fail_on.as_deref() == Some(table) {
                return Err(DbExportError::query_failed(
                    format!("Failed to read table 'public.{}'", table),
                    std::io::Error::other("relation is locked"),
                ));
            }
            self.tables
                .get(table)
                .cloned()
                .ok_or_else(|| DbExportError::configuration("unknown table"))
        }
    }

    fn config_for(dir: &std::path::Path) -> ExportConfig {
        ExportConfig::default().with_output_dir(dir.join("exports"))
    }

    #[tokio::test]
    async fn test_zero_tables_creates_directory_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let mut source = MemorySource::default();

        let summary = export_tables(&mut source, &config, |_| {}).await.unwrap();

        assert!(summary.tables.is_empty());
        assert!(config.output_dir.is_dir());
        assert_eq!(std::fs::read_dir(&config.output_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_exports_in_alphabetical_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let mut source = MemorySource::default()
            .with_table("users", &["id"], &[&[Some("1")]])
            .with_table("attendance", &["id"], &[])
            .with_table("rfid_tags", &["id", "uid"], &[&[Some("1"), Some("04A2")]]);

        let mut seen = Vec::new();
        let summary = export_tables(&mut source, &config, |t| seen.push(t.table_name.clone()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["attendance", "rfid_tags", "users"]);
        assert_eq!(source.fetched, seen);
        assert_eq!(summary.tables.len(), 3);
        assert_eq!(summary.total_rows(), 2);
    }

    #[tokio::test]
    async fn test_file_has_header_plus_one_line_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let mut source = MemorySource::default().with_table(
            "members",
            &["id", "name", "email"],
            &[
                &[Some("1"), Some("Ada"), Some("ada@example.com")],
                &[Some("2"), Some("Grace"), None],
                &[Some("3"), Some("Linus"), Some("linus@example.com")],
            ],
        );

        let summary = export_tables(&mut source, &config, |_| {}).await.unwrap();
        let exported = &summary.tables[0];
        assert_eq!(exported.row_count, 3);
        assert_eq!(exported.column_count, 3);
        assert_eq!(exported.path, config.output_dir.join("members.csv"));

        let content = std::fs::read_to_string(&exported.path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "id,name,email");
        assert_eq!(lines[2], "2,Grace,");
        assert!(lines.iter().all(|l| l.split(',').count() == 3));
    }

    #[tokio::test]
    async fn test_rerun_produces_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let mut source =
            MemorySource::default().with_table("tags", &["uid"], &[&[Some("A1")], &[Some("B2")]]);

        export_tables(&mut source, &config, |_| {}).await.unwrap();
        let first = std::fs::read(config.output_dir.join("tags.csv")).unwrap();

        export_tables(&mut source, &config, |_| {}).await.unwrap();
        let second = std::fs::read(config.output_dir.join("tags.csv")).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failure_stops_run_and_keeps_earlier_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let mut source = MemorySource::default()
            .with_table("alpha", &["id"], &[&[Some("1")]])
            .with_table("bravo", &["id"], &[&[Some("2")]])
            .with_table("charlie", &["id"], &[&[Some("3")]]);
        source.fail_on = Some("bravo".to_string());

        let mut reported = Vec::new();
        let result =
            export_tables(&mut source, &config, |t| reported.push(t.table_name.clone())).await;

        assert!(matches!(result, Err(DbExportError::Query { .. })));
        assert_eq!(reported, vec!["alpha"]);
        assert_eq!(source.fetched, vec!["alpha", "bravo"]);
        assert!(config.output_dir.join("alpha.csv").exists());
        assert!(!config.output_dir.join("bravo.csv").exists());
        assert!(!config.output_dir.join("charlie.csv").exists());
    }

    #[tokio::test]
    async fn test_colliding_file_names_are_rejected_before_export() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let mut source = MemorySource::default()
            .with_table("a/b", &["id"], &[&[Some("1")]])
            .with_table("a_b", &["id"], &[&[Some("2")]]);

        let result = export_tables(&mut source, &config, |_| {}).await;

        assert!(matches!(
            &result,
            Err(DbExportError::Configuration { message })
                if message.contains("a/b") && message.contains("a_b.csv")
        ));
        assert!(source.fetched.is_empty());
        assert!(!config.output_dir.join("a_b.csv").exists());
    }
}
