//! Domain models for Overlay Alerts
//!
//! An [`Alert`] is one donation/support event to be displayed once. Its
//! payload arrives as webhook JSON and is decoded leniently: a malformed or
//! partial document yields defaults rather than a rejected row, because a
//! broken single alert must never halt the whole queue.

use serde::{Deserialize, Serialize};

use crate::money::format_money;
use crate::timestamps::{micros_to_naive, now_micros};

/// Mint an opaque identifier for locally created alerts and overlays.
///
/// Webhook-side ingest supplies its own ids; this is only used for test
/// alerts and overlay bootstrap.
#[must_use]
pub fn new_event_id() -> String {
    let mut bytes = [0_u8; 16];
    if getrandom::getrandom(&mut bytes).is_err() {
        // Timestamp fallback keeps ids unique enough for a single process.
        return format!("t{:x}", now_micros());
    }
    let mut out = String::with_capacity(32);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

// =============================================================================
// Alert
// =============================================================================

/// Category tag carried in the alert payload (`type` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Donation,
    Subscription,
    Commission,
    ShopOrder,
}

impl Default for AlertKind {
    fn default() -> Self {
        Self::Donation
    }
}

impl AlertKind {
    /// Display label for the history view; also the wire tag.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Donation => "Donation",
            Self::Subscription => "Subscription",
            Self::Commission => "Commission",
            Self::ShopOrder => "Shop Order",
        }
    }

    /// Unknown tags fold into `Donation` so rendering never fails.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Subscription" => Self::Subscription,
            "Commission" => Self::Commission,
            "Shop Order" => Self::ShopOrder,
            _ => Self::Donation,
        }
    }
}

impl Serialize for AlertKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for AlertKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// Structured fields of one alert, decoded best-effort from webhook JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPayload {
    #[serde(rename = "type")]
    pub kind: AlertKind,

    /// Monetary amount as the webhook sent it (e.g. `"3.00"`).
    pub amount: Option<String>,

    /// ISO 4217 currency code (e.g. `"USD"`).
    pub currency: Option<String>,

    /// Sender display name.
    pub from_name: Option<String>,

    /// Optional free-text message from the sender.
    pub message: Option<String>,

    #[serde(rename = "isTest")]
    pub is_test: bool,
}

impl AlertPayload {
    /// Decode a payload JSON document, falling back to defaults on any parse
    /// failure so a broken row renders with placeholders instead of erroring.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!("malformed alert payload, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Formatted money string for this payload, if an amount is present.
    #[must_use]
    pub fn money(&self) -> Option<String> {
        format_money(self.amount.as_deref(), self.currency.as_deref())
    }
}

/// One donation/support event to be displayed once.
///
/// Immutable once created, mutable only in its acknowledgement flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Opaque unique identifier, stable across fetches (dedup key).
    pub id: String,

    /// Owning overlay identity; every queue operation is scoped to one.
    pub overlay_id: String,

    /// Microseconds since Unix epoch; ascending = oldest first.
    pub created_at: i64,

    pub payload: AlertPayload,

    /// `false` = eligible for playback/fetch; `true` = display lifecycle
    /// completed, never re-enqueued.
    pub acknowledged: bool,
}

impl Alert {
    /// Create a new unacknowledged alert with a minted id.
    #[must_use]
    pub fn new(overlay_id: impl Into<String>, payload: AlertPayload) -> Self {
        Self {
            id: new_event_id(),
            overlay_id: overlay_id.into(),
            created_at: now_micros(),
            payload,
            acknowledged: false,
        }
    }

    /// Get `created_at` as `NaiveDateTime`
    #[must_use]
    pub fn created_at_naive(&self) -> chrono::NaiveDateTime {
        micros_to_naive(self.created_at)
    }
}

// =============================================================================
// OverlaySettings
// =============================================================================

/// Screen slot the alert box is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessagePosition {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// Entrance animation style for the alert box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageAnimation {
    BounceIn,
    FadeIn,
    SlideIn,
}

/// Per-overlay display options.
///
/// Created with defaults when an overlay identity is created; user-updated at
/// any time (full-document replacement only). The playback engine reads only
/// `messageDuration`; the external renderer reads everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// On-screen duration for one alert, in seconds.
    #[serde(rename = "messageDuration")]
    pub message_duration_secs: f64,

    /// Text template; `{from_name}`, `{amount}` and `{message}` are replaced
    /// at render time.
    #[serde(rename = "messageText")]
    pub message_text: String,

    #[serde(rename = "messageTextColor")]
    pub text_color: String,

    #[serde(rename = "messageBackgroundColor")]
    pub background_color: String,

    #[serde(rename = "messagePosition")]
    pub position: MessagePosition,

    #[serde(rename = "messageAnimation")]
    pub animation: MessageAnimation,

    #[serde(rename = "messageShowIcon")]
    pub show_icon: bool,

    #[serde(rename = "messageHasCurvedCorners")]
    pub curved_corners: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            message_duration_secs: crate::config::DEFAULT_MESSAGE_DURATION_SECONDS,
            message_text: "{from_name} sent {amount}".to_string(),
            text_color: "#ffffff".to_string(),
            background_color: "#ff5e5b".to_string(),
            position: MessagePosition::TopCenter,
            animation: MessageAnimation::BounceIn,
            show_icon: true,
            curved_corners: true,
        }
    }
}

impl OverlaySettings {
    /// On-screen duration as a [`std::time::Duration`], clamped so a bad
    /// settings document can never stall or flicker the queue.
    #[must_use]
    pub fn message_duration(&self) -> std::time::Duration {
        let secs = if self.message_duration_secs.is_finite() && self.message_duration_secs > 0.0 {
            self.message_duration_secs.min(600.0)
        } else {
            crate::config::DEFAULT_MESSAGE_DURATION_SECONDS
        };
        std::time::Duration::from_secs_f64(secs)
    }

    /// Decode a settings JSON document, falling back to defaults on failure.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::debug!("malformed overlay settings, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Render the message template for one payload with best-effort defaults
    /// for missing fields.
    #[must_use]
    pub fn render_message(&self, payload: &AlertPayload) -> String {
        let from_name = payload.from_name.as_deref().unwrap_or("Someone");
        let amount = payload.money().unwrap_or_else(|| "money".to_string());
        let message = payload.message.as_deref().unwrap_or("");
        self.message_text
            .replace("{from_name}", from_name)
            .replace("{amount}", &amount)
            .replace("{message}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_decodes_webhook_wire_format() {
        let raw = r#"{
            "type": "Donation",
            "amount": "3.00",
            "currency": "USD",
            "from_name": "Jo",
            "message": "Keep it up!",
            "isTest": false
        }"#;
        let payload = AlertPayload::decode(raw);
        assert_eq!(payload.kind, AlertKind::Donation);
        assert_eq!(payload.amount.as_deref(), Some("3.00"));
        assert_eq!(payload.from_name.as_deref(), Some("Jo"));
        assert!(!payload.is_test);
    }

    #[test]
    fn payload_decode_is_best_effort() {
        // Malformed JSON, partial documents, and unknown type tags all yield
        // renderable payloads instead of errors.
        assert_eq!(AlertPayload::decode("{not json"), AlertPayload::default());
        let partial = AlertPayload::decode(r#"{"from_name": "Jo"}"#);
        assert_eq!(partial.from_name.as_deref(), Some("Jo"));
        assert_eq!(partial.kind, AlertKind::Donation);
        let unknown = AlertPayload::decode(r#"{"type": "Mystery Event"}"#);
        assert_eq!(unknown.kind, AlertKind::Donation);
    }

    #[test]
    fn shop_order_kind_round_trips_with_space() {
        let payload = AlertPayload::decode(r#"{"type": "Shop Order"}"#);
        assert_eq!(payload.kind, AlertKind::ShopOrder);
        let encoded = serde_json::to_string(&payload).expect("serialize");
        assert!(encoded.contains("Shop Order"));
    }

    #[test]
    fn new_alerts_are_unacknowledged_with_unique_ids() {
        let a = Alert::new("overlay-1", AlertPayload::default());
        let b = Alert::new("overlay-1", AlertPayload::default());
        assert!(!a.acknowledged);
        assert_ne!(a.id, b.id);
        assert_eq!(a.overlay_id, "overlay-1");
    }

    #[test]
    fn settings_defaults_and_duration_clamping() {
        let settings = OverlaySettings::default();
        assert!((settings.message_duration_secs - 5.0).abs() < f64::EPSILON);
        assert_eq!(
            settings.message_duration(),
            std::time::Duration::from_secs(5)
        );

        let bad = OverlaySettings {
            message_duration_secs: -3.0,
            ..OverlaySettings::default()
        };
        assert_eq!(bad.message_duration(), std::time::Duration::from_secs(5));

        let huge = OverlaySettings {
            message_duration_secs: 1e9,
            ..OverlaySettings::default()
        };
        assert_eq!(huge.message_duration(), std::time::Duration::from_secs(600));
    }

    #[test]
    fn settings_decode_falls_back_to_defaults() {
        assert_eq!(OverlaySettings::decode("]["), OverlaySettings::default());
        let partial = OverlaySettings::decode(r#"{"messageDuration": 8}"#);
        assert!((partial.message_duration_secs - 8.0).abs() < f64::EPSILON);
        assert_eq!(partial.position, MessagePosition::TopCenter);
    }

    #[test]
    fn render_message_fills_placeholders_and_defaults() {
        let settings = OverlaySettings::default();
        let payload = AlertPayload {
            amount: Some("3.00".into()),
            currency: Some("USD".into()),
            from_name: Some("Jo".into()),
            ..AlertPayload::default()
        };
        assert_eq!(settings.render_message(&payload), "Jo sent $3.00");

        // Missing fields render with placeholders, never panic.
        assert_eq!(
            settings.render_message(&AlertPayload::default()),
            "Someone sent money"
        );
    }

    #[test]
    fn settings_document_uses_original_wire_keys() {
        let encoded =
            serde_json::to_string(&OverlaySettings::default()).expect("serialize settings");
        for key in [
            "messageDuration",
            "messageText",
            "messageTextColor",
            "messageBackgroundColor",
            "messagePosition",
            "messageAnimation",
            "messageShowIcon",
            "messageHasCurvedCorners",
        ] {
            assert!(encoded.contains(key), "missing settings key {key}");
        }
    }
}
