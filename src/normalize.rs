//! Turns raw delimited bytes into a header plus rectangular-ish records.
//!
//! The first record is the header. Later records with more fields than the
//! header are truncated to the header width; records with fewer fields are
//! passed through short and left for the loader's fill pass. Blank lines
//! after the header count as records with no fields at all.

use encoding_rs::{Encoding, UTF_8};
use log::{debug, warn};

use crate::{
    error::DecodeError,
    io_utils::{self, DEFAULT_CSV_DELIMITER},
};

#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub truncated_rows: usize,
    pub short_rows: usize,
    pub had_substitutions: bool,
}

impl NormalizedTable {
    pub fn field_count(&self) -> usize {
        self.headers.len()
    }

    /// Blank lines become zero-field rows, left for the loader's fill pass.
    fn push_blank_rows(&mut self, count: usize) {
        for _ in 0..count {
            if self.field_count() > 0 {
                self.short_rows += 1;
            }
            self.rows.push(Vec::new());
        }
    }
}

pub fn normalize(bytes: &[u8], options: &NormalizeOptions) -> Result<NormalizedTable, DecodeError> {
    let decoded = io_utils::decode_input(bytes, options.encoding);
    if decoded.had_substitutions {
        warn!(
            "Replaced undecodable {} byte sequence(s) with U+FFFD",
            options.encoding.name()
        );
    }

    let blank_runs = blank_line_runs(&decoded.text, options.delimiter);
    let mut reader = io_utils::open_csv_reader(decoded.text.as_bytes(), options.delimiter);
    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        Some(Err(source)) => return Err(DecodeError::Csv { record: 1, source }),
        None => return Err(DecodeError::MissingHeader),
    };
    let num_fields = headers.len();
    debug!(
        "Header has {num_fields} field(s) using delimiter '{}'",
        io_utils::printable_delimiter(options.delimiter)
    );

    let mut table = NormalizedTable {
        headers,
        had_substitutions: decoded.had_substitutions,
        ..NormalizedTable::default()
    };

    let mut record_count = 1;
    for (idx, record) in records.enumerate() {
        let record = record.map_err(|source| DecodeError::Csv {
            record: idx + 2,
            source,
        })?;
        table.push_blank_rows(blank_runs.get(record_count).copied().unwrap_or(0));
        record_count += 1;
        let row = truncate_record(record.iter(), num_fields);
        if record.len() > num_fields {
            table.truncated_rows += 1;
        } else if record.len() < num_fields {
            table.short_rows += 1;
        }
        table.rows.push(row);
    }
    table.push_blank_rows(blank_runs.get(record_count).copied().unwrap_or(0));

    if table.truncated_rows > 0 {
        warn!(
            "Truncated {} ragged row(s) to {} field(s)",
            table.truncated_rows, num_fields
        );
    }
    Ok(table)
}

/// Keeps at most `num_fields` leading values; shorter input stays short.
pub fn truncate_record<'a, I>(fields: I, num_fields: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    fields
        .into_iter()
        .take(num_fields)
        .map(str::to_string)
        .collect()
}

/// Counts empty lines between records, outside quoted fields.
///
/// Entry `k` holds the blank lines read before record `k` (the header is
/// record 0); the final entry holds the blank lines after the last record.
/// The `csv` reader skips these lines, so they are recovered here.
pub(crate) fn blank_line_runs(text: &str, delimiter: u8) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut runs = vec![0usize];
    let mut at_line_start = true;
    let mut field_start = true;
    let mut in_quotes = false;
    let mut idx = 0;

    while idx < bytes.len() {
        let byte = bytes[idx];
        idx += 1;

        if in_quotes {
            if byte == b'"' {
                if bytes.get(idx) == Some(&b'"') {
                    idx += 1;
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        if byte == b'\r' || byte == b'\n' {
            if byte == b'\r' && bytes.get(idx) == Some(&b'\n') {
                idx += 1;
            }
            if at_line_start {
                if let Some(last) = runs.last_mut() {
                    *last += 1;
                }
            } else {
                runs.push(0);
                at_line_start = true;
                field_start = true;
            }
            continue;
        }

        at_line_start = false;
        if byte == delimiter {
            field_start = true;
        } else {
            in_quotes = byte == b'"' && field_start;
            field_start = false;
        }
    }

    if !at_line_start {
        runs.push(0);
    }
    runs
}
