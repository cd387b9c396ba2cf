//! The fetch/acknowledge boundary.
//!
//! [`AlertSource`] abstracts the backing store for the playback driver and
//! the history view, so both are testable against fakes. The store-backed
//! implementation opens a fresh sync connection per call; a failed open or
//! query surfaces as a transient error the caller retries on its next
//! scheduled poll, keeping whatever data it already has.

use overlay_alerts_core::{Alert, Error, Result};
use overlay_alerts_db::AlertStore;

/// Narrow store contract consumed by playback and history.
pub trait AlertSource: Send {
    /// Alerts with `acknowledged = false`, oldest first.
    fn fetch_unacknowledged(&self, overlay_id: &str) -> Result<Vec<Alert>>;

    /// All alerts (test and real, acknowledged and not), newest first,
    /// optionally restricted to `created_at >= since_micros`.
    fn fetch_all(&self, overlay_id: &str, since_micros: Option<i64>) -> Result<Vec<Alert>>;

    /// Mark one alert acknowledged. Idempotent.
    fn acknowledge(&self, alert_id: &str) -> Result<()>;
}

/// Store-backed source addressed by database URL.
#[derive(Debug, Clone)]
pub struct StoreSource {
    database_url: String,
}

impl StoreSource {
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    fn open(&self) -> std::result::Result<AlertStore, overlay_alerts_db::DbError> {
        AlertStore::open_url(&self.database_url)
    }
}

impl AlertSource for StoreSource {
    fn fetch_unacknowledged(&self, overlay_id: &str) -> Result<Vec<Alert>> {
        self.open()
            .and_then(|store| store.fetch_unacknowledged(overlay_id))
            .map_err(|e| Error::Fetch(e.to_string()))
    }

    fn fetch_all(&self, overlay_id: &str, since_micros: Option<i64>) -> Result<Vec<Alert>> {
        self.open()
            .and_then(|store| store.fetch_all(overlay_id, since_micros))
            .map_err(|e| Error::Fetch(e.to_string()))
    }

    fn acknowledge(&self, alert_id: &str) -> Result<()> {
        self.open()
            .and_then(|store| store.acknowledge(alert_id))
            .map_err(|e| Error::Acknowledge(e.to_string()))
    }
}
