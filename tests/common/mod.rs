#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use csv_loader::config::LoaderConfig;
use csv_loader::describe::read_rows;
use rusqlite::Connection;
use tempfile::{TempDir, tempdir};

/// Scratch directory holding input files and a database, removed on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes raw `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    pub fn database(&self) -> PathBuf {
        self.temp_dir.path().join("loader.db")
    }

    pub fn config(&self) -> LoaderConfig {
        LoaderConfig::new(self.database())
    }

    pub fn connect(&self) -> Connection {
        Connection::open(self.database()).expect("open database")
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn all_rows(conn: &Connection, table: &str) -> Vec<Vec<String>> {
    read_rows(conn, table, None).expect("read rows")
}
