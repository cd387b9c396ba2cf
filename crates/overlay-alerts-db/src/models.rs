//! Database row models using sqlmodel derive macros
//!
//! These models map directly to `SQLite` tables. All datetime fields use
//! `i64` (microseconds since Unix epoch); alert payloads and overlay
//! settings are stored as JSON text columns and decoded best-effort.

use serde::{Deserialize, Serialize};
use sqlmodel::Model;

use overlay_alerts_core::timestamps::now_micros;
use overlay_alerts_core::{Alert, AlertPayload, OverlaySettings, new_event_id};

// =============================================================================
// Overlay
// =============================================================================

/// One overlay identity: the scoping key under which alerts, settings, and
/// subscriptions are partitioned.
#[derive(Model, Debug, Clone, Serialize, Deserialize)]
#[sqlmodel(table = "overlays")]
pub struct OverlayRow {
    #[sqlmodel(primary_key)]
    pub id: String,

    /// Settings JSON document, replaced wholesale on update.
    #[sqlmodel(default = "'{}'")]
    pub settings: String,

    /// Microseconds since Unix epoch
    pub created_at: i64,

    /// Bumped on every settings replacement; watched for change detection.
    pub updated_at: i64,
}

impl Default for OverlayRow {
    fn default() -> Self {
        let now = now_micros();
        Self {
            id: new_event_id(),
            settings: "{}".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl OverlayRow {
    /// Create a new overlay row carrying the default settings document.
    #[must_use]
    pub fn new(id: String) -> Self {
        let now = now_micros();
        let settings = serde_json::to_string(&OverlaySettings::default())
            .unwrap_or_else(|_| "{}".to_string());
        Self {
            id,
            settings,
            created_at: now,
            updated_at: now,
        }
    }

    /// Decode the settings document, defaulting on malformed JSON.
    #[must_use]
    pub fn decode_settings(&self) -> OverlaySettings {
        OverlaySettings::decode(&self.settings)
    }
}

// =============================================================================
// Alert
// =============================================================================

/// One stored alert. Immutable once created apart from `acknowledged`.
#[derive(Model, Debug, Clone, Serialize, Deserialize)]
#[sqlmodel(table = "alerts")]
pub struct AlertRow {
    #[sqlmodel(primary_key)]
    pub id: String,

    pub overlay_id: String,

    /// Microseconds since Unix epoch; arrival/display order.
    pub created_at: i64,

    /// Webhook payload JSON document.
    #[sqlmodel(default = "'{}'")]
    pub payload: String,

    /// 0 = eligible for playback, 1 = display lifecycle completed.
    #[sqlmodel(default = "0")]
    pub acknowledged: i64,
}

impl AlertRow {
    /// Build a row from a domain alert.
    #[must_use]
    pub fn from_alert(alert: &Alert) -> Self {
        let payload =
            serde_json::to_string(&alert.payload).unwrap_or_else(|_| "{}".to_string());
        Self {
            id: alert.id.clone(),
            overlay_id: alert.overlay_id.clone(),
            created_at: alert.created_at,
            payload,
            acknowledged: i64::from(alert.acknowledged),
        }
    }

    /// Get `created_at` as `NaiveDateTime`
    #[must_use]
    pub fn created_at_naive(&self) -> chrono::NaiveDateTime {
        overlay_alerts_core::timestamps::micros_to_naive(self.created_at)
    }

    /// Convert into a domain alert, decoding the payload best-effort.
    #[must_use]
    pub fn into_alert(self) -> Alert {
        Alert {
            payload: AlertPayload::decode(&self.payload),
            id: self.id,
            overlay_id: self.overlay_id,
            created_at: self.created_at,
            acknowledged: self.acknowledged != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_row_round_trips_through_domain_type() {
        let alert = Alert::new(
            "overlay-1",
            AlertPayload {
                amount: Some("3.00".into()),
                currency: Some("USD".into()),
                from_name: Some("Jo".into()),
                ..AlertPayload::default()
            },
        );
        let row = AlertRow::from_alert(&alert);
        assert_eq!(row.acknowledged, 0);
        let back = row.into_alert();
        assert_eq!(back, alert);
    }

    #[test]
    fn malformed_payload_column_decodes_to_defaults() {
        let row = AlertRow {
            id: "a1".into(),
            overlay_id: "o1".into(),
            created_at: 1,
            payload: "{broken".into(),
            acknowledged: 0,
        };
        let alert = row.into_alert();
        assert_eq!(alert.payload, AlertPayload::default());
    }

    #[test]
    fn new_overlay_rows_carry_default_settings_document() {
        let row = OverlayRow::new("o1".into());
        assert_eq!(row.decode_settings(), OverlaySettings::default());
        assert_eq!(row.created_at, row.updated_at);
    }
}
