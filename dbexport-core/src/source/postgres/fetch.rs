//! Full-table reads.
//!
//! Every column is cast to `text` in the query, so each value arrives in the
//! server's own output format regardless of its type (arrays, json, ranges,
//! user-defined types). The whole result is materialized before returning.

use super::enumeration::table_columns;
use crate::error::DbExportError;
use crate::models::TableData;
use crate::Result;
use sqlx::{PgConnection, Row};

/// Quotes a PostgreSQL identifier, doubling embedded quotes.
///
/// ```rust
/// use dbexport_core::source::postgres::quote_identifier;
///
/// assert_eq!(quote_identifier("users"), "\"users\"");
/// assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
/// ```
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Builds the unfiltered, unordered `SELECT` for one table.
pub fn build_select_query(schema: &str, table: &str, columns: &[String]) -> String {
    let relation = format!("{}.{}", quote_identifier(schema), quote_identifier(table));

    if columns.is_empty() {
        return format!("SELECT FROM {}", relation);
    }

    let projection: Vec<String> = columns
        .iter()
        .map(|c| format!("{}::text", quote_identifier(c)))
        .collect();
    format!("SELECT {} FROM {}", projection.join(", "), relation)
}

/// Reads the complete contents of `schema.table`.
///
/// # Errors
/// Returns a query error if the column lookup or the `SELECT` fails
pub async fn fetch_table(conn: &mut PgConnection, schema: &str, table: &str) -> Result<TableData> {
    let columns = table_columns(conn, schema, table).await?;
    let sql = build_select_query(schema, table, &columns);
    tracing::debug!("Reading {}.{}: {}", schema, table, sql);

    let rows = sqlx::query(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            DbExportError::query_failed(format!("Failed to read table '{}.{}'", schema, table), e)
        })?;

    let width = columns.len();
    let mut data = TableData::new(table, columns);
    data.rows.reserve(rows.len());

    for row in &rows {
        let values = (0..width)
            .map(|index| {
                row.try_get::<Option<String>, _>(index).map_err(|e| {
                    DbExportError::query_failed(
                        format!("Failed to decode column {} of '{}.{}'", index, schema, table),
                        e,
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        data.rows.push(values);
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("Order Items"), "\"Order Items\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_build_select_query() {
        let columns = vec!["id".to_string(), "uid".to_string()];
        assert_eq!(
            build_select_query("public", "rfid_tags", &columns),
            "SELECT \"id\"::text, \"uid\"::text FROM \"public\".\"rfid_tags\""
        );
    }

    #[test]
    fn test_build_select_query_mixed_case_table() {
        let columns = vec!["Id".to_string()];
        assert_eq!(
            build_select_query("public", "Members", &columns),
            "SELECT \"Id\"::text FROM \"public\".\"Members\""
        );
    }

    #[test]
    fn test_build_select_query_no_columns() {
        assert_eq!(
            build_select_query("public", "empty", &[]),
            "SELECT FROM \"public\".\"empty\""
        );
    }
}
