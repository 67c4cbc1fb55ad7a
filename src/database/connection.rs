//! SQLite connection management for the dashboard.

use rusqlite::Connection;
use std::path::Path;

use super::migrations;

/// Owns the `rusqlite::Connection` and guarantees the schema is current.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file at `path` and runs pending migrations.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path.as_ref())?;
        log::debug!("opened service database at {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    /// Opens a throwaway in-memory database, used by tests.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if a migration fails.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Returns the underlying connection for queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
