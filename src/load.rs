//! Row-by-row bulk insertion into a freshly created table.
//!
//! Rows are written in input order with one prepared, positional `INSERT`
//! reused per row. The whole load runs in a single transaction: when a row is
//! rejected the transaction is rolled back and the table is left as created,
//! with no rows.

use itertools::Itertools;
use log::{debug, info, warn};
use rusqlite::{Connection, params_from_iter};

use crate::{
    error::LoadError,
    naming::{quote_identifier, sanitize_columns},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_inserted: usize,
    /// Rows that were shorter than the header and had empty text filled in.
    pub padded_rows: usize,
}

pub fn insert_statement(table: &str, columns: &[String]) -> String {
    let names = columns.iter().map(|c| quote_identifier(c)).join(", ");
    let placeholders = (1..=columns.len()).map(|idx| format!("?{idx}")).join(", ");
    format!(
        "INSERT INTO {} ({names}) VALUES ({placeholders})",
        quote_identifier(table)
    )
}

/// Fills absent trailing values with empty text so the row matches `width`.
///
/// Returns `None` when the row carries more values than there are columns.
pub fn fill_absent(mut row: Vec<String>, width: usize) -> Option<Vec<String>> {
    if row.len() > width {
        return None;
    }
    row.resize(width, String::new());
    Some(row)
}

pub fn load_rows<I>(
    conn: &mut Connection,
    table: &str,
    headers: &[String],
    rows: I,
) -> Result<LoadReport, LoadError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let columns = sanitize_columns(table, headers)?;
    let width = columns.len();
    let sql = insert_statement(table, &columns);
    debug!("Insert statement: {sql}");

    let tx = conn.transaction().map_err(|source| LoadError::Prepare {
        table: table.to_string(),
        source,
    })?;
    let mut report = LoadReport::default();
    {
        let mut stmt = tx.prepare(&sql).map_err(|source| LoadError::Prepare {
            table: table.to_string(),
            source,
        })?;
        for (idx, row) in rows.into_iter().enumerate() {
            let row_number = idx + 1;
            let found = row.len();
            let padded = found < width;
            let values = fill_absent(row, width).ok_or_else(|| LoadError::ColumnCountMismatch {
                table: table.to_string(),
                row: row_number,
                expected: width,
                found,
            })?;
            stmt.execute(params_from_iter(values.iter()))
                .map_err(|source| LoadError::Write {
                    table: table.to_string(),
                    row: row_number,
                    source,
                })?;
            if padded {
                report.padded_rows += 1;
            }
            report.rows_inserted += 1;
        }
    }
    tx.commit().map_err(|source| LoadError::Commit {
        table: table.to_string(),
        source,
    })?;

    if report.padded_rows > 0 {
        warn!(
            "Filled empty values into {} short row(s) of '{table}'",
            report.padded_rows
        );
    }
    info!("Inserted {} row(s) into '{table}'", report.rows_inserted);
    Ok(report)
}
