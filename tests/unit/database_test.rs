//! Unit tests for the dashboard database layer (connection + migrations).

use dashboard::database::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use dashboard::database::Database;

fn column_names(db: &Database, table: &str) -> Vec<String> {
    let mut stmt = db
        .connection()
        .prepare(&format!("PRAGMA table_info({})", table))
        .unwrap();
    stmt.query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
}

#[test]
fn test_open_in_memory_succeeds() {
    assert!(Database::open_in_memory().is_ok());
}

#[test]
fn test_migrations_create_services_table_and_index() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();

    let table: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='services'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(table);

    let index: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name='idx_services_position'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(index);
}

#[test]
fn test_services_table_has_all_columns() {
    let db = Database::open_in_memory().unwrap();
    let columns = column_names(&db, "services");
    for expected in [
        "id",
        "name",
        "url",
        "icon",
        "icon_type",
        "icon_width",
        "icon_height",
        "icon_placeholder",
        "position",
        "created_at",
        "updated_at",
        "last_seen_online",
    ] {
        assert!(
            columns.iter().any(|c| c == expected),
            "column '{}' missing, have {:?}",
            expected,
            columns
        );
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_reopening_file_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dashboard.db");

    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO services (id, name, url, icon, icon_type, position, created_at, updated_at) \
                 VALUES ('a', 'Router', 'http://10.0.0.1', x'00', 'image/png', 0, 1, 1)",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);

    let versions: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(versions, CURRENT_SCHEMA_VERSION as i64);
}
