//! Column and table name sanitizing.
//!
//! [`sanitize_name`] is the single transformation applied to raw headers:
//! spaces become underscores and parentheses are dropped. Nothing else is
//! touched (case, punctuation, leading digits, reserved words), so every
//! identifier that reaches SQL goes through [`quote_identifier`] as well.

use std::collections::HashMap;

use crate::error::SchemaError;

pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|ch| !matches!(ch, '(' | ')'))
        .map(|ch| if ch == ' ' { '_' } else { ch })
        .collect()
}

/// Sanitizes every header in order and rejects empty results and collisions.
///
/// Two raw headers that sanitize to the same name fail with
/// [`SchemaError::DuplicateColumn`] naming both raw headers. Names are
/// compared ASCII case-insensitively, as SQLite compares column names.
pub fn sanitize_columns(table: &str, headers: &[String]) -> Result<Vec<String>, SchemaError> {
    if headers.is_empty() {
        return Err(SchemaError::NoColumns {
            table: table.to_string(),
        });
    }
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(headers.len());
    let mut columns = Vec::with_capacity(headers.len());
    for (idx, raw) in headers.iter().enumerate() {
        let sanitized = sanitize_name(raw);
        if sanitized.is_empty() {
            return Err(SchemaError::EmptyColumnName {
                position: idx + 1,
                raw: raw.clone(),
            });
        }
        if let Some(first) = seen.insert(sanitized.to_ascii_lowercase(), raw.as_str()) {
            return Err(SchemaError::DuplicateColumn {
                first: first.to_string(),
                second: raw.clone(),
                sanitized,
            });
        }
        columns.push(sanitized);
    }
    Ok(columns)
}

pub fn sanitize_table_name(raw: &str) -> Result<String, SchemaError> {
    let sanitized = sanitize_name(raw.trim());
    if sanitized.is_empty() {
        return Err(SchemaError::EmptyTableName {
            raw: raw.to_string(),
        });
    }
    Ok(sanitized)
}

/// Wraps an identifier in double quotes, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
