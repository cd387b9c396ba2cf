//! Database layer for Overlay Alerts
//!
//! This crate provides:
//! - `SQLite` storage via `sqlmodel` on frankensqlite (sync connection surface)
//! - Schema creation
//! - The [`AlertStore`] contract consumed by the playback and history paths
//!
//! # Timestamp Convention
//!
//! All timestamps are stored as `i64` (microseconds since Unix epoch),
//! matching `sqlmodel`'s convention.

#![forbid(unsafe_code)]

pub mod error;
pub mod models;
pub mod schema;
pub mod store;

pub use error::{DbError, DbResult};
pub use models::{AlertRow, OverlayRow};
pub use schema::{CREATE_TABLES_SQL, ensure_schema};
pub use store::{AlertStore, SettingsSnapshot};

// Re-export for consumers that need raw access (tests, tooling)
pub use sqlmodel_core;

/// The connection type used by this crate.
pub type DbConn = sqlmodel_frankensqlite::FrankenConnection;

/// Extract the filesystem path from a `sqlite:///...` database URL.
/// Bare paths pass through unchanged.
#[must_use]
pub fn sqlite_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite:///")
        .or_else(|| database_url.strip_prefix("sqlite://"))
        .unwrap_or(database_url)
}
