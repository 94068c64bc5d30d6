#![forbid(unsafe_code)]

mod error;
mod queries;
mod resolve;
mod types;

pub use error::StoreError;
pub use resolve::*;
pub use types::*;

use rusqlite::{Connection, OpenFlags};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const REQUIRED_TABLES: [&str; 3] = ["node", "nodelocation", "noderegistration"];

/// Read-only handle on a simulation telemetry database.
///
/// The connection is released when the store is dropped; `close` does the
/// same but reports failures.
#[derive(Debug)]
pub struct TelemetryStore {
    conn: Connection,
    path: PathBuf,
    tables: Vec<String>,
}

impl TelemetryStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(StoreError::NotFound {
                file_name: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                searched: vec![path],
            });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(&path, flags)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA query_only = ON;")?;

        let tables = preflight_gate(&conn, &path)?;
        tracing::info!(path = %path.display(), tables = %tables.join(", "), "store connected");

        Ok(Self { conn, path, tables })
    }

    /// Resolves `candidate` through `locator`, then opens it.
    pub fn open_located(locator: &StoreLocator, candidate: &Path) -> Result<Self, StoreError> {
        let path = locator.resolve(candidate)?;
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every user table found at connect time, sorted.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn file_size(&self) -> Result<u64, StoreError> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, err)| StoreError::Sql(err))
    }
}

fn preflight_gate(conn: &Connection, path: &Path) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    let missing = REQUIRED_TABLES
        .iter()
        .filter(|table| !tables.contains(**table))
        .map(|table| table.to_string())
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(StoreError::MissingTables {
            path: path.to_path_buf(),
            missing,
        });
    }

    Ok(tables.into_iter().collect())
}

fn to_sqlite_limit(limit: Option<usize>) -> Result<i64, StoreError> {
    match limit {
        // SQLite treats a negative LIMIT as unbounded.
        None => Ok(-1),
        Some(value) => {
            i64::try_from(value).map_err(|_| StoreError::InvalidInput("numeric overflow"))
        }
    }
}

fn to_count(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::InvalidInput("negative count"))
}
