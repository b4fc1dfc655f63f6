//! End-to-end ingestion of one dataset: normalize, recreate, load.
//!
//! Any tabular source (local upload, remote fetch) produces a [`Dataset`] and
//! goes through the same [`ingest`] call. Re-ingesting a table name always
//! replaces the table with the new contents.
//!
//! Concurrent ingestions into the *same* table name are not serialized here;
//! callers that need isolation must serialize per table themselves.

use log::info;
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    config::LoaderConfig,
    db,
    error::IngestError,
    load::load_rows,
    naming::sanitize_table_name,
    normalize::{NormalizeOptions, normalize},
    schema::recreate_table,
};

#[derive(Debug, Clone)]
pub struct Dataset {
    pub table: String,
    pub bytes: Vec<u8>,
    pub options: NormalizeOptions,
}

impl Dataset {
    pub fn new(table: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            table: table.into(),
            bytes: bytes.into(),
            options: NormalizeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub table: String,
    pub columns: Vec<String>,
    pub rows_inserted: usize,
    pub truncated_rows: usize,
    pub padded_rows: usize,
    pub substituted_input: bool,
}

/// Ingests `dataset` on a connection opened from `config` for this call only.
pub fn ingest(config: &LoaderConfig, dataset: &Dataset) -> Result<Summary, IngestError> {
    let mut conn = db::open_connection(config).map_err(|source| IngestError::Connect {
        table: dataset.table.clone(),
        source,
    })?;
    ingest_with(&mut conn, dataset)
}

pub fn ingest_with(conn: &mut Connection, dataset: &Dataset) -> Result<Summary, IngestError> {
    let table = sanitize_table_name(&dataset.table).map_err(|source| IngestError::Schema {
        table: dataset.table.clone(),
        source,
    })?;

    let normalized =
        normalize(&dataset.bytes, &dataset.options).map_err(|source| IngestError::Decode {
            table: table.clone(),
            source,
        })?;

    let columns = recreate_table(conn, &table, &normalized.headers).map_err(|source| {
        IngestError::Schema {
            table: table.clone(),
            source,
        }
    })?;

    let report = load_rows(conn, &table, &normalized.headers, normalized.rows).map_err(
        |source| IngestError::Load {
            table: table.clone(),
            source,
        },
    )?;

    info!(
        "Loaded {} row(s) into '{}' ({} truncated, {} padded)",
        report.rows_inserted, table, normalized.truncated_rows, report.padded_rows
    );
    Ok(Summary {
        table,
        columns,
        rows_inserted: report.rows_inserted,
        truncated_rows: normalized.truncated_rows,
        padded_rows: report.padded_rows,
        substituted_input: normalized.had_substitutions,
    })
}
