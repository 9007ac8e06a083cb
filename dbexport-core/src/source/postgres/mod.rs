//! PostgreSQL table source over a single session.
//!
//! # Module Structure
//! - `connection`: opening and closing the session
//! - `enumeration`: catalog queries for table and column names
//! - `fetch`: full-table reads rendered as text

mod connection;
mod enumeration;
mod fetch;

use super::TableSource;
use crate::{Result, models::TableData};
use async_trait::async_trait;
use sqlx::PgConnection;

pub use enumeration::{list_tables, table_columns};
pub use fetch::{build_select_query, fetch_table, quote_identifier};

/// One open PostgreSQL session, reused for every query of the run.
pub struct PostgresSource {
    conn: PgConnection,
    target: String,
}

impl std::fmt::Debug for PostgresSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSource")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TableSource for PostgresSource {
    async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        enumeration::list_tables(&mut self.conn, schema).await
    }

    async fn fetch_table(&mut self, schema: &str, table: &str) -> Result<TableData> {
        fetch::fetch_table(&mut self.conn, schema, table).await
    }
}
