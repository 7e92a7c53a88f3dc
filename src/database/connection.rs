//! Database connection management
//!
//! This module provides the SQLite connection wrapper the bundled
//! collaborators run against.

use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;
use crate::schema::SchemaProbe;

/// Busy timeout applied when none is configured
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around SQLite connections,
/// handling both file-based and in-memory databases with consistent
/// configuration.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&str>, busy_timeout_ms: u64) -> Result<Self> {
        let conn = match path {
            Some(p) => {
                debug!("opening database at {}", p);
                Connection::open(p)?
            }
            None => Connection::open_in_memory()?,
        };

        let db = DatabaseConn { conn };
        db.configure(busy_timeout_ms)?;
        Ok(db)
    }

    /// Open a database file with the default busy timeout
    pub fn open_path(path: &str) -> Result<Self> {
        Self::open(Some(path), DEFAULT_BUSY_TIMEOUT_MS)
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(None, DEFAULT_BUSY_TIMEOUT_MS)
    }

    fn configure(&self, busy_timeout_ms: u64) -> Result<()> {
        // in-memory databases report "memory" here; that's fine
        let _: String = self
            .conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        self.conn.execute("PRAGMA synchronous=NORMAL", [])?;
        self.conn.execute("PRAGMA foreign_keys=ON", [])?;

        // a locked store fails the script instead of blocking startup forever
        self.conn
            .busy_timeout(Duration::from_millis(busy_timeout_ms))?;

        Ok(())
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> Result<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    /// Begin an unchecked transaction
    ///
    /// Dropping the returned transaction without committing rolls it back.
    pub fn transaction(&self) -> Result<rusqlite::Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        table_exists(&self.conn, table_name)
    }
}

impl SchemaProbe for DatabaseConn {
    fn table_exists(&self, table: &str) -> Result<bool> {
        DatabaseConn::table_exists(self, table)
    }
}

pub(crate) fn table_exists(conn: &Connection, table_name: &str) -> Result<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
        [table_name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
