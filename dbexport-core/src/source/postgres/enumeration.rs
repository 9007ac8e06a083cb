//! Catalog queries: which tables exist and what their columns are called.
//!
//! Both queries go through `information_schema`, so views in the schema are
//! listed alongside base tables.

use crate::error::DbExportError;
use crate::Result;
use sqlx::PgConnection;

// Bytewise ordering, independent of the database's default collation.
const LIST_TABLES_QUERY: &str = r#"
    SELECT t.table_name::text AS table_name
    FROM information_schema.tables t
    WHERE t.table_schema = $1
    ORDER BY t.table_name COLLATE "C"
"#;

const TABLE_COLUMNS_QUERY: &str = r#"
    SELECT c.column_name::text AS column_name
    FROM information_schema.columns c
    WHERE c.table_schema = $1
    AND c.table_name = $2
    ORDER BY c.ordinal_position
"#;

/// Lists all table names in `schema`, sorted by name.
///
/// An empty schema yields an empty list.
///
/// # Errors
/// Returns a query error if the catalog cannot be read
pub async fn list_tables(conn: &mut PgConnection, schema: &str) -> Result<Vec<String>> {
    tracing::debug!("Listing tables in schema '{}'", schema);

    let tables: Vec<String> = sqlx::query_scalar(LIST_TABLES_QUERY)
        .bind(schema)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            DbExportError::query_failed(
                format!("Failed to list tables in schema '{}'", schema),
                e,
            )
        })?;

    tracing::trace!("Schema '{}' tables: {:?}", schema, tables);
    Ok(tables)
}

/// Column names of `schema.table` in declaration order.
///
/// # Errors
/// Returns a query error if the catalog cannot be read
pub async fn table_columns(
    conn: &mut PgConnection,
    schema: &str,
    table: &str,
) -> Result<Vec<String>> {
    sqlx::query_scalar(TABLE_COLUMNS_QUERY)
        .bind(schema)
        .bind(table)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            DbExportError::query_failed(
                format!("Failed to read columns of '{}.{}'", schema, table),
                e,
            )
        })
}
