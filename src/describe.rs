//! Table inspection: column structure plus a sample of stored rows.

use anyhow::{Context, Result, bail};
use log::info;
use rusqlite::{Connection, types::Value};

use crate::{
    config::LoaderConfig,
    db,
    naming::{quote_identifier, sanitize_table_name},
    table,
};

pub const DEFAULT_SAMPLE_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescription {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    pub sample: Vec<Vec<String>>,
}

impl TableDescription {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let sql = format!("PRAGMA table_info({})", quote_identifier(table));
    let mut stmt = conn.prepare(&sql)?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                declared_type: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Reads rows in storage order, rendering every value as text.
pub fn read_rows(conn: &Connection, table: &str, limit: Option<usize>) -> Result<Vec<Vec<String>>> {
    let mut sql = format!("SELECT * FROM {} ORDER BY rowid", quote_identifier(table));
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("Reading rows from '{table}'"))?;
    let width = stmt.column_count();
    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|idx| row.get::<_, Value>(idx).map(render_value))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn describe_table(conn: &Connection, table: &str, sample_rows: usize) -> Result<TableDescription> {
    let columns = table_columns(conn, table)?;
    if columns.is_empty() {
        bail!("Table '{table}' does not exist");
    }
    let sample = read_rows(conn, table, Some(sample_rows))?;
    Ok(TableDescription {
        table: table.to_string(),
        columns,
        sample,
    })
}

/// Looks `requested` up under the same sanitized name ingestion stores it as.
pub fn execute(config: &LoaderConfig, requested: &str, sample_rows: usize) -> Result<()> {
    let table_name = sanitize_table_name(requested)?;
    let table_name = table_name.as_str();
    let conn = db::open_connection(config)?;
    let description = describe_table(&conn, table_name, sample_rows)
        .with_context(|| format!("Describing table '{table_name}'"))?;

    println!("Table structure:");
    let structure = description
        .columns
        .iter()
        .map(|c| vec![c.name.clone(), c.declared_type.clone()])
        .collect::<Vec<_>>();
    table::print_table(&["column".to_string(), "type".to_string()], &structure);

    println!();
    println!("Sample data:");
    table::print_table(&description.column_names(), &description.sample);
    info!(
        "Described '{}' ({} column(s), {} sample row(s))",
        description.table,
        description.columns.len(),
        description.sample.len()
    );
    Ok(())
}

fn render_value(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(v) => v,
        Value::Blob(v) => String::from_utf8_lossy(&v).into_owned(),
    }
}
