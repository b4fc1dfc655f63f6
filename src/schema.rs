//! Destructive (re)creation of destination tables.
//!
//! Every ingestion drops the table of the same name and creates it again with
//! one `TEXT` column per sanitized header. Both statements run in a single
//! transaction: SQLite DDL is transactional, so a rejected `CREATE` rolls the
//! `DROP` back and readers keep seeing the previous table.

use itertools::Itertools;
use log::{debug, info};
use rusqlite::Connection;

use crate::{
    error::SchemaError,
    naming::{quote_identifier, sanitize_columns},
};

pub const COLUMN_TYPE: &str = "TEXT";

pub fn drop_table_statement(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_identifier(table))
}

pub fn create_table_statement(table: &str, columns: &[String]) -> String {
    let definitions = columns
        .iter()
        .map(|column| format!("{} {COLUMN_TYPE}", quote_identifier(column)))
        .join(", ");
    format!("CREATE TABLE {} ({definitions})", quote_identifier(table))
}

/// Drops `table` if it exists and creates it with the sanitized `headers`.
///
/// Returns the sanitized column names in header order.
pub fn recreate_table(
    conn: &mut Connection,
    table: &str,
    headers: &[String],
) -> Result<Vec<String>, SchemaError> {
    let columns = sanitize_columns(table, headers)?;
    debug!("Sanitized columns for '{table}': {columns:?}");

    let backend = |source| SchemaError::Backend {
        table: table.to_string(),
        source,
    };
    let tx = conn.transaction().map_err(backend)?;
    tx.execute(&drop_table_statement(table), [])
        .map_err(backend)?;
    tx.execute(&create_table_statement(table, &columns), [])
        .map_err(backend)?;
    tx.commit().map_err(backend)?;

    info!("Recreated table '{table}' with {} column(s)", columns.len());
    Ok(columns)
}
