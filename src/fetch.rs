//! Remote blueprint retrieval.
//!
//! Downloads a CSV export for a network/search pair and feeds it through the
//! regular ingestion pipeline, using the search term as the table name.

use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use reqwest::blocking::Client;
use url::Url;

use crate::{
    config::{BlueprintSource, LoaderConfig},
    ingest::{Dataset, Summary, ingest},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub fn blueprint_url(source: &BlueprintSource, network: &str, search: &str) -> Result<Url> {
    let mut url =
        Url::parse(&source.url).with_context(|| format!("Parsing blueprint URL '{}'", source.url))?;
    url.query_pairs_mut()
        .append_pair("token", &source.token)
        .append_pair("network_name", network)
        .append_pair("search", search);
    Ok(url)
}

pub fn download(client: &Client, url: &Url) -> Result<Vec<u8>> {
    // reqwest errors carry the full URL, token included.
    let response = client
        .get(url.clone())
        .send()
        .map_err(reqwest::Error::without_url)
        .with_context(|| format!("Requesting {}", redacted(url)))?
        .error_for_status()
        .map_err(reqwest::Error::without_url)
        .with_context(|| format!("Blueprint service rejected {}", redacted(url)))?;
    let body = response
        .bytes()
        .map_err(reqwest::Error::without_url)
        .context("Reading blueprint response body")?;
    Ok(body.to_vec())
}

pub fn fetch_blueprints(config: &LoaderConfig, network: &str, search: &str) -> Result<Summary> {
    let client = Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Building HTTP client")?;
    fetch_blueprints_with(&client, config, network, search)
}

pub fn fetch_blueprints_with(
    client: &Client,
    config: &LoaderConfig,
    network: &str,
    search: &str,
) -> Result<Summary> {
    let source = config.blueprint_source()?;
    let url = blueprint_url(source, network, search)?;
    info!("Fetching blueprints from {}", redacted(&url));

    let bytes = download(client, &url)?;
    info!("Downloaded {} byte(s) for search '{search}'", bytes.len());

    let dataset = Dataset::new(search, bytes);
    ingest(config, &dataset).with_context(|| format!("Loading blueprints for '{search}'"))
}

/// Renders `url` with the access token masked, for log and error messages.
pub fn redacted(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "token" {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
