//! The alert backing store.
//!
//! [`AlertStore`] wraps one sync `SQLite` connection and exposes the narrow
//! contract the playback and history paths consume: fetch unacknowledged,
//! fetch all, acknowledge, settings read / full-document replace, and the
//! insert used by webhook ingest and test alerts.

use sqlmodel_core::Value;

use overlay_alerts_core::timestamps::now_micros;
use overlay_alerts_core::{Alert, OverlaySettings};

use crate::error::{DbError, DbResult};
use crate::models::{AlertRow, OverlayRow};
use crate::schema::ensure_schema;
use crate::{DbConn, sqlite_path};

/// Overlay settings document plus the revision stamp used for change
/// detection by the settings watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsSnapshot {
    pub settings: OverlaySettings,
    pub updated_at: i64,
}

/// Sync store over the overlay/alert tables.
pub struct AlertStore {
    conn: DbConn,
}

impl AlertStore {
    /// Open (creating if necessary) the store at a filesystem path and make
    /// sure the schema exists.
    pub fn open(path: &str) -> DbResult<Self> {
        let conn = DbConn::open_file(path).map_err(|e| DbError::Sqlite(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open the store from a `sqlite:///...` database URL or bare path.
    pub fn open_url(database_url: &str) -> DbResult<Self> {
        Self::open(sqlite_path(database_url))
    }

    // =========================================================================
    // Alerts
    // =========================================================================

    /// Insert one alert row (webhook ingest and test alerts).
    pub fn insert_alert(&self, alert: &Alert) -> DbResult<()> {
        let row = AlertRow::from_alert(alert);
        self.conn
            .execute_sync(
                "INSERT INTO alerts (id, overlay_id, created_at, payload, acknowledged) \
                 VALUES (?, ?, ?, ?, ?)",
                &[
                    Value::Text(row.id),
                    Value::Text(row.overlay_id),
                    Value::BigInt(row.created_at),
                    Value::Text(row.payload),
                    Value::BigInt(row.acknowledged),
                ],
            )
            .map_err(|e| {
                let message = e.to_string();
                if message.to_lowercase().contains("unique")
                    || message.to_lowercase().contains("constraint")
                {
                    DbError::Duplicate {
                        entity: "Alert",
                        identifier: alert.id.clone(),
                    }
                } else {
                    DbError::Sqlite(message)
                }
            })?;
        Ok(())
    }

    /// Alerts with `acknowledged = 0` for one overlay, oldest first
    /// (`created_at` ascending, id as tiebreaker).
    pub fn fetch_unacknowledged(&self, overlay_id: &str) -> DbResult<Vec<Alert>> {
        let rows = self
            .conn
            .query_sync(
                "SELECT id, overlay_id, created_at, payload, acknowledged FROM alerts \
                 WHERE overlay_id = ? AND acknowledged = 0 \
                 ORDER BY created_at ASC, id ASC",
                &[Value::Text(overlay_id.to_string())],
            )
            .map_err(|e| DbError::Sqlite(e.to_string()))?;
        Ok(rows.into_iter().filter_map(row_to_alert).collect())
    }

    /// All alerts (test and real, acknowledged and not) for one overlay,
    /// newest first, optionally restricted to `created_at >= since_micros`.
    pub fn fetch_all(&self, overlay_id: &str, since_micros: Option<i64>) -> DbResult<Vec<Alert>> {
        let mut sql = String::from(
            "SELECT id, overlay_id, created_at, payload, acknowledged FROM alerts \
             WHERE overlay_id = ?",
        );
        let mut params = vec![Value::Text(overlay_id.to_string())];
        if let Some(since) = since_micros {
            sql.push_str(" AND created_at >= ?");
            params.push(Value::BigInt(since));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let rows = self
            .conn
            .query_sync(&sql, &params)
            .map_err(|e| DbError::Sqlite(e.to_string()))?;
        Ok(rows.into_iter().filter_map(row_to_alert).collect())
    }

    /// Mark one alert acknowledged.
    ///
    /// Idempotent: acknowledging an already-acknowledged alert is a no-op
    /// success. Row existence is decided by a read-back rather than the
    /// driver's affected-row count.
    pub fn acknowledge(&self, alert_id: &str) -> DbResult<()> {
        let rows = self
            .conn
            .query_sync(
                "SELECT id FROM alerts WHERE id = ?",
                &[Value::Text(alert_id.to_string())],
            )
            .map_err(|e| DbError::Sqlite(e.to_string()))?;
        if rows.is_empty() {
            return Err(DbError::not_found("Alert", alert_id));
        }

        self.conn
            .execute_sync(
                "UPDATE alerts SET acknowledged = 1 WHERE id = ?",
                &[Value::Text(alert_id.to_string())],
            )
            .map_err(|e| DbError::Sqlite(e.to_string()))?;
        tracing::debug!(alert_id = %alert_id, "alert acknowledged");
        Ok(())
    }

    // =========================================================================
    // Overlays / settings
    // =========================================================================

    /// Create an overlay identity with the default settings document.
    /// Returns the overlay id (minted when none is supplied).
    pub fn create_overlay(&self, overlay_id: Option<&str>) -> DbResult<String> {
        let row = overlay_id.map_or_else(OverlayRow::default, |id| OverlayRow::new(id.to_string()));

        let existing = self
            .conn
            .query_sync(
                "SELECT id FROM overlays WHERE id = ?",
                &[Value::Text(row.id.clone())],
            )
            .map_err(|e| DbError::Sqlite(e.to_string()))?;
        if !existing.is_empty() {
            return Err(DbError::Duplicate {
                entity: "Overlay",
                identifier: row.id,
            });
        }

        let settings = serde_json::to_string(&OverlaySettings::default())
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        self.conn
            .execute_sync(
                "INSERT INTO overlays (id, settings, created_at, updated_at) VALUES (?, ?, ?, ?)",
                &[
                    Value::Text(row.id.clone()),
                    Value::Text(settings),
                    Value::BigInt(row.created_at),
                    Value::BigInt(row.updated_at),
                ],
            )
            .map_err(|e| DbError::Sqlite(e.to_string()))?;
        Ok(row.id)
    }

    /// Read one overlay's settings document and revision stamp.
    pub fn get_settings(&self, overlay_id: &str) -> DbResult<SettingsSnapshot> {
        let rows = self
            .conn
            .query_sync(
                "SELECT settings, updated_at FROM overlays WHERE id = ?",
                &[Value::Text(overlay_id.to_string())],
            )
            .map_err(|e| DbError::Sqlite(e.to_string()))?;
        let Some(row) = rows.into_iter().next() else {
            return Err(DbError::not_found("Overlay", overlay_id));
        };

        let raw = row.get_named::<String>("settings").unwrap_or_default();
        let updated_at = row.get_named::<i64>("updated_at").unwrap_or(0);
        Ok(SettingsSnapshot {
            settings: OverlaySettings::decode(&raw),
            updated_at,
        })
    }

    /// Replace one overlay's settings document wholesale (partial updates
    /// are not supported at this boundary) and bump the revision stamp.
    pub fn update_settings(
        &self,
        overlay_id: &str,
        settings: &OverlaySettings,
    ) -> DbResult<()> {
        let previous = self.get_settings(overlay_id)?;
        let document = serde_json::to_string(settings)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        // Strictly increasing so watchers always observe a replacement.
        let updated_at = now_micros().max(previous.updated_at + 1);

        self.conn
            .execute_sync(
                "UPDATE overlays SET settings = ?, updated_at = ? WHERE id = ?",
                &[
                    Value::Text(document),
                    Value::BigInt(updated_at),
                    Value::Text(overlay_id.to_string()),
                ],
            )
            .map_err(|e| DbError::Sqlite(e.to_string()))?;
        Ok(())
    }
}

/// Decode one result row into a domain alert, best-effort on the payload.
/// Structurally broken rows are skipped rather than failing the whole fetch.
fn row_to_alert(row: sqlmodel_core::Row) -> Option<Alert> {
    let row = AlertRow {
        id: row.get_named::<String>("id").ok()?,
        overlay_id: row.get_named::<String>("overlay_id").ok()?,
        created_at: row.get_named::<i64>("created_at").ok()?,
        payload: row.get_named::<String>("payload").unwrap_or_default(),
        acknowledged: row.get_named::<i64>("acknowledged").unwrap_or(0),
    };
    Some(row.into_alert())
}
