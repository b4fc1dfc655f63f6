use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::describe::DEFAULT_SAMPLE_ROWS;

#[derive(Debug, Parser)]
#[command(author, version, about = "Load CSV files into freshly rebuilt database tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replace one table per input file with that file's contents
    Ingest(IngestArgs),
    /// Download blueprints for a network/search pair and load them
    Fetch(FetchArgs),
    /// Show the column structure and a sample of rows for a table
    Describe(DescribeArgs),
}

#[derive(Debug, Args)]
pub struct DatabaseArgs {
    /// SQLite database file (overrides CSV_LOADER_DATABASE)
    #[arg(short = 'd', long = "database")]
    pub database: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// One or more CSV files to load
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Destination table name (defaults to the file name without extension)
    #[arg(short = 't', long = "table")]
    pub table: Option<String>,
    #[command(flatten)]
    pub db: DatabaseArgs,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Print one JSON summary per loaded table instead of a message
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Network name passed to the blueprint service
    #[arg(long)]
    pub network: String,
    /// Search term; also used as the destination table name
    #[arg(long)]
    pub search: String,
    #[command(flatten)]
    pub db: DatabaseArgs,
    /// Print the load summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// Table to inspect
    #[arg(short = 't', long = "table")]
    pub table: String,
    /// Number of sample rows to display
    #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
    pub rows: usize,
    #[command(flatten)]
    pub db: DatabaseArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
