//! Input decoding, delimiter resolution, and CSV reader construction.
//!
//! All raw bytes handed to the loader flow through [`decode_input`] before
//! parsing. Decoding is best-effort: a leading byte-order mark is stripped and
//! malformed sequences are replaced with U+FFFD instead of failing the file.

use std::{borrow::Cow, path::Path};

use anyhow::{Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

#[derive(Debug)]
pub struct DecodedInput<'a> {
    pub text: Cow<'a, str>,
    /// Set when at least one byte sequence was replaced with U+FFFD.
    pub had_substitutions: bool,
}

pub fn decode_input<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> DecodedInput<'a> {
    let (text, had_substitutions) = encoding.decode_with_bom_removal(bytes);
    DecodedInput {
        text,
        had_substitutions,
    }
}

/// Quote-aware reader that yields every record, header included, and
/// tolerates records whose field count differs from the first one.
pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: std::io::Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
