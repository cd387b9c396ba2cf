//! Database schema creation
//!
//! Creates the overlay and alert tables plus the indexes both fetch paths
//! lean on.

use crate::DbConn;
use crate::error::{DbError, DbResult};

/// SQL statements for creating the database schema
pub const CREATE_TABLES_SQL: &str = r"
-- Overlays table: one row per overlay identity, settings as a JSON document
CREATE TABLE IF NOT EXISTS overlays (
    id TEXT PRIMARY KEY,
    settings TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Alerts table: payload as the webhook JSON document
CREATE TABLE IF NOT EXISTS alerts (
    id TEXT PRIMARY KEY,
    overlay_id TEXT NOT NULL REFERENCES overlays(id),
    created_at INTEGER NOT NULL,
    payload TEXT NOT NULL DEFAULT '{}',
    acknowledged INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_alerts_overlay_unacked
    ON alerts(overlay_id, acknowledged, created_at);
CREATE INDEX IF NOT EXISTS idx_alerts_overlay_created
    ON alerts(overlay_id, created_at);
";

/// Run every schema statement against a sync connection. Idempotent.
pub fn ensure_schema(conn: &DbConn) -> DbResult<()> {
    for statement in CREATE_TABLES_SQL.split(';') {
        let body: String = statement
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let body = body.trim();
        if body.is_empty() {
            continue;
        }
        conn.execute_sync(body, &[])
            .map_err(|e| DbError::Schema(e.to_string()))?;
    }
    Ok(())
}
