//! Dashboard: a registry of bookmarked home-network services.
//!
//! The library keeps services in a user-defined order, persists them to
//! SQLite, fetches their favicons, and notifies presentation layers of every
//! change. The `dashboard-rpc` binary exposes it to a UI over stdin/stdout.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
