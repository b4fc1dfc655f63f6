//! Upload intake: turns user-supplied files into [`Dataset`]s.
//!
//! Files with an unsupported extension (or no name at all) are skipped with a
//! warning. The table name defaults to the file stem.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use log::{info, warn};

use crate::{
    config::LoaderConfig,
    ingest::{Dataset, Summary, ingest},
    io_utils,
    normalize::NormalizeOptions,
};

pub const ALLOWED_EXTENSIONS: &[&str] = &["csv", "tsv"];
pub const NOTHING_TO_LOAD: &str = "No files selected or all files were of invalid types";

pub fn is_allowed_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

pub fn table_name_for(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone)]
pub struct IntakeOptions {
    pub table: Option<String>,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

pub fn collect_datasets(inputs: &[PathBuf], options: &IntakeOptions) -> Result<Vec<Dataset>> {
    if options.table.is_some() && inputs.len() > 1 {
        bail!("--table can only be used with a single input file");
    }

    let mut datasets = Vec::with_capacity(inputs.len());
    for input in inputs {
        if input.as_os_str().is_empty() {
            continue;
        }
        if !is_allowed_file(input) {
            warn!("Skipping {input:?}: only .csv and .tsv files are accepted");
            continue;
        }
        let Some(table) = options.table.clone().or_else(|| table_name_for(input)) else {
            warn!("Skipping {input:?}: cannot derive a table name");
            continue;
        };
        let bytes = fs::read(input).with_context(|| format!("Reading input file {input:?}"))?;
        let normalize_options = NormalizeOptions {
            delimiter: io_utils::resolve_input_delimiter(input, options.delimiter),
            encoding: options.encoding,
        };
        datasets.push(Dataset::new(table, bytes).with_options(normalize_options));
    }

    if datasets.is_empty() {
        bail!(NOTHING_TO_LOAD);
    }
    Ok(datasets)
}

pub fn load_datasets(config: &LoaderConfig, datasets: &[Dataset]) -> Result<Vec<Summary>> {
    let mut summaries = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let summary =
            ingest(config, dataset).with_context(|| format!("Loading '{}'", dataset.table))?;
        info!("✓ {} -> '{}'", dataset.table, summary.table);
        summaries.push(summary);
    }
    Ok(summaries)
}
