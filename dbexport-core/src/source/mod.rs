//! Where table data comes from.
//!
//! The export pipeline only talks to a [`TableSource`]. The PostgreSQL
//! session in [`postgres`] is the production implementation.

pub mod postgres;

use crate::{Result, models::TableData};
use async_trait::async_trait;

pub use postgres::PostgresSource;

/// A database the exporter can read tables from.
///
/// Calls are issued strictly one after another over a single session, so
/// implementations take `&mut self`.
#[async_trait]
pub trait TableSource: Send {
    /// Lists the tables of `schema`, ordered by name.
    async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>>;

    /// Reads every row of `schema.table` along with its column names.
    async fn fetch_table(&mut self, schema: &str, table: &str) -> Result<TableData>;
}
