//! Schema migrations for the dashboard SQLite database.
//!
//! A `schema_version` table records which migrations have been applied so
//! each one runs exactly once.

use rusqlite::{params, Connection};

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Returns the applied schema version (0 for a fresh database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending migrations. Safe to call on every startup.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Services table")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Track when a service was last seen online")?;
    }

    if current < CURRENT_SCHEMA_VERSION {
        log::info!(
            "migrated service database from schema v{} to v{}",
            current,
            CURRENT_SCHEMA_VERSION
        );
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        params![version, now, description],
    )?;
    Ok(())
}

/// V1: services and their display order.
///
/// `position` is not UNIQUE: range shifts pass through transient duplicates.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS services (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            url TEXT NOT NULL,
            icon BLOB NOT NULL,
            icon_type TEXT NOT NULL,
            icon_width INTEGER NOT NULL DEFAULT 0,
            icon_height INTEGER NOT NULL DEFAULT 0,
            icon_placeholder INTEGER NOT NULL DEFAULT 1,
            position INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_services_position ON services(position);
        ",
    )
}

/// V2: `last_seen_online` column, added to databases created by V1.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    if conn
        .prepare("SELECT last_seen_online FROM services LIMIT 0")
        .is_err()
    {
        conn.execute_batch("ALTER TABLE services ADD COLUMN last_seen_online INTEGER;")?;
    }
    Ok(())
}
