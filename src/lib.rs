pub mod cli;
pub mod config;
pub mod db;
pub mod describe;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod intake;
pub mod io_utils;
pub mod load;
pub mod naming;
pub mod normalize;
pub mod schema;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands},
    config::LoaderConfig,
    ingest::Summary,
    intake::IntakeOptions,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_loader", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest(args) => handle_ingest(&args),
        Commands::Fetch(args) => handle_fetch(&args),
        Commands::Describe(args) => {
            let config = LoaderConfig::from_env(args.db.database.as_deref())?;
            describe::execute(&config, &args.table, args.rows)
        }
    }
}

fn handle_ingest(args: &cli::IngestArgs) -> Result<()> {
    let config = LoaderConfig::from_env(args.db.database.as_deref())?;
    let options = IntakeOptions {
        table: args.table.clone(),
        delimiter: args.delimiter,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
    };
    info!(
        "Ingesting {} file(s) into {:?}",
        args.inputs.len(),
        config.database
    );
    let datasets = intake::collect_datasets(&args.inputs, &options)?;
    let summaries = intake::load_datasets(&config, &datasets)?;
    report(&summaries, args.json)
}

fn handle_fetch(args: &cli::FetchArgs) -> Result<()> {
    let config = LoaderConfig::from_env(args.db.database.as_deref())?;
    let summary = fetch::fetch_blueprints(&config, &args.network, &args.search)?;
    report(&[summary], args.json)
}

fn report(summaries: &[Summary], json: bool) -> Result<()> {
    if json {
        for summary in summaries {
            let line = serde_json::to_string(summary).context("Serializing load summary")?;
            println!("{line}");
        }
    } else {
        let tables = summaries.iter().map(|s| s.table.as_str()).join(", ");
        println!("CSV data uploaded to the database successfully for {tables}");
    }
    Ok(())
}
