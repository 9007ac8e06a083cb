//! Core pipeline for dbexport.
//!
//! Opens one PostgreSQL session, lists the tables of a schema, and writes
//! each table to `<output_dir>/<table>.csv`, one after another.
//!
//! # Security
//! - Passwords are kept in zeroizing containers and never logged
//! - The session runs with read-only transactions by default
//! - Identifiers are quoted before being interpolated into SQL
//!
//! # Example
//! ```rust,no_run
//! use dbexport_core::{ExportConfig, PostgresSource, export_tables};
//!
//! # async fn run() -> dbexport_core::Result<()> {
//! let config = ExportConfig::default();
//! let mut source = PostgresSource::connect(&config.connection).await?;
//! let summary = export_tables(&mut source, &config, |t| {
//!     println!("{} -> {}", t.table_name, t.path.display());
//! })
//! .await?;
//! source.close().await?;
//! println!("{} tables", summary.tables.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod exporter;
pub mod logging;
pub mod models;
pub mod output;
pub mod source;

// Re-export commonly used types
pub use config::{ConnectionConfig, ExportConfig};
pub use error::{DbExportError, Result, redact_database_url};
pub use exporter::export_tables;
pub use logging::init_logging;
pub use models::{ExportSummary, ExportedTable, TableData};
pub use source::{PostgresSource, TableSource};
