//! Dashboard database layer.
//!
//! Provides SQLite connection management and schema migrations.
//!
//! # Usage
//!
//! ```no_run
//! use dashboard::database::Database;
//!
//! let db = Database::open("dashboard.db").expect("failed to open database");
//! let services = db.connection().query_row("SELECT COUNT(*) FROM services", [], |row| row.get::<_, i64>(0));
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
