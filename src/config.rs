//! Process configuration, resolved once at start-up.
//!
//! Values come from a `.env` file (if present), then the process
//! environment, then command-line overrides. The resulting [`LoaderConfig`]
//! is passed by reference to everything that needs the backend.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use log::debug;

pub const DATABASE_VAR: &str = "CSV_LOADER_DATABASE";
pub const BUSY_TIMEOUT_VAR: &str = "CSV_LOADER_BUSY_TIMEOUT_MS";
pub const BLUEPRINTS_URL_VAR: &str = "BLUEPRINTS_URL";
pub const BLUEPRINTS_TOKEN_VAR: &str = "BLUEPRINTS_TOKEN";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintSource {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub database: PathBuf,
    pub busy_timeout: Duration,
    pub blueprints: Option<BlueprintSource>,
}

impl LoaderConfig {
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            blueprints: None,
        }
    }

    pub fn from_env(database_override: Option<&Path>) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {path:?}");
        }
        Self::from_lookup(database_override, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(database_override: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match database_override {
            Some(path) => path.to_path_buf(),
            None => lookup(DATABASE_VAR).map(PathBuf::from).ok_or_else(|| {
                anyhow!("No database configured; pass --database or set {DATABASE_VAR}")
            })?,
        };

        let busy_timeout = match lookup(BUSY_TIMEOUT_VAR) {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("Parsing {BUSY_TIMEOUT_VAR}='{raw}'"))?,
            ),
            None => Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        };

        let blueprints = match (lookup(BLUEPRINTS_URL_VAR), lookup(BLUEPRINTS_TOKEN_VAR)) {
            (Some(url), Some(token)) => Some(BlueprintSource { url, token }),
            _ => None,
        };

        Ok(Self {
            database,
            busy_timeout,
            blueprints,
        })
    }

    pub fn blueprint_source(&self) -> Result<&BlueprintSource> {
        self.blueprints.as_ref().ok_or_else(|| {
            anyhow!("Remote fetch requires {BLUEPRINTS_URL_VAR} and {BLUEPRINTS_TOKEN_VAR}")
        })
    }
}
