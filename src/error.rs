//! Error taxonomy for the ingestion pipeline.
//!
//! Each pipeline stage owns one error type:
//!
//! - [`DecodeError`] - input bytes that cannot be turned into a header row
//! - [`ConnectivityError`] - the backend could not be opened or configured
//! - [`SchemaError`] - the drop/create of the destination table was rejected
//! - [`LoadError`] - a row could not be written
//!
//! [`IngestError`] wraps whichever of these stopped an ingestion and tags it
//! with the [`Stage`] that failed. Ragged rows and undecodable bytes are
//! recovered inside the normalizer and never show up here.

use std::{fmt, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Input is empty; expected a header row")]
    MissingHeader,

    #[error("Malformed CSV at record {record}: {source}")]
    Csv {
        record: usize,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("Opening database {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Configuring database connection: {0}")]
    Configure(#[source] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Table '{table}' has no columns")]
    NoColumns { table: String },

    #[error("Table name '{raw}' is empty after sanitizing")]
    EmptyTableName { raw: String },

    #[error("Column {position} ('{raw}') is empty after sanitizing")]
    EmptyColumnName { position: usize, raw: String },

    #[error("Columns '{first}' and '{second}' both sanitize to '{sanitized}'")]
    DuplicateColumn {
        first: String,
        second: String,
        sanitized: String,
    },

    #[error("Backend rejected DDL for table '{table}': {source}")]
    Backend {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Row {row} has {found} value(s) but table '{table}' has {expected} column(s)")]
    ColumnCountMismatch {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Columns(#[from] SchemaError),

    #[error("Writing row {row} into '{table}': {source}")]
    Write {
        table: String,
        row: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Committing rows into '{table}': {source}")]
    Commit {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Preparing insert for '{table}': {source}")]
    Prepare {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    Connect,
    Schema,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Decode => "decode",
            Stage::Connect => "connect",
            Stage::Schema => "schema",
            Stage::Load => "load",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Ingesting '{table}' failed at {} stage", Stage::Decode)]
    Decode {
        table: String,
        #[source]
        source: DecodeError,
    },

    #[error("Ingesting '{table}' failed at {} stage", Stage::Connect)]
    Connect {
        table: String,
        #[source]
        source: ConnectivityError,
    },

    #[error("Ingesting '{table}' failed at {} stage", Stage::Schema)]
    Schema {
        table: String,
        #[source]
        source: SchemaError,
    },

    #[error("Ingesting '{table}' failed at {} stage", Stage::Load)]
    Load {
        table: String,
        #[source]
        source: LoadError,
    },
}

impl IngestError {
    pub fn stage(&self) -> Stage {
        match self {
            IngestError::Decode { .. } => Stage::Decode,
            IngestError::Connect { .. } => Stage::Connect,
            IngestError::Schema { .. } => Stage::Schema,
            IngestError::Load { .. } => Stage::Load,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            IngestError::Decode { table, .. }
            | IngestError::Connect { table, .. }
            | IngestError::Schema { table, .. }
            | IngestError::Load { table, .. } => table,
        }
    }
}
