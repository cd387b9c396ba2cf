//! Configuration management for Overlay Alerts
//!
//! Configuration is loaded from environment variables. Every knob has an
//! embedded default so a bare process starts without any environment at all.

use std::env;
use std::time::Duration;

/// Default playback poll interval in seconds. Materially shorter than the
/// history refresh so perceived creation-to-display latency stays bounded.
const DEFAULT_PLAYBACK_POLL_SECONDS: u64 = 3;

/// Default history view refresh interval in seconds.
const DEFAULT_HISTORY_REFRESH_SECONDS: u64 = 15;

/// Default settings watch interval in seconds.
const DEFAULT_SETTINGS_WATCH_SECONDS: u64 = 2;

/// Default on-screen duration for one alert, in seconds. Used when an
/// overlay's settings document was never loaded.
pub const DEFAULT_MESSAGE_DURATION_SECONDS: f64 = 5.0;

/// Main configuration struct for Overlay Alerts
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Backing store location, `sqlite:///path/to.db` or a bare file path.
    pub database_url: String,

    /// Seconds between unacknowledged-alert polls on the playback path.
    pub playback_poll_seconds: u64,

    /// Seconds between full history refreshes.
    pub history_refresh_seconds: u64,

    /// Seconds between overlay settings re-reads by the settings watcher.
    pub settings_watch_seconds: u64,

    /// Fallback on-screen duration when no settings document is available.
    pub default_message_duration_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:///overlay-alerts.db".to_string(),
            playback_poll_seconds: DEFAULT_PLAYBACK_POLL_SECONDS,
            history_refresh_seconds: DEFAULT_HISTORY_REFRESH_SECONDS,
            settings_watch_seconds: DEFAULT_SETTINGS_WATCH_SECONDS,
            default_message_duration_secs: DEFAULT_MESSAGE_DURATION_SECONDS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_value("DATABASE_URL") {
            config.database_url = v;
        }
        config.playback_poll_seconds = env_u64(
            "OVERLAY_PLAYBACK_POLL_SECONDS",
            config.playback_poll_seconds,
        );
        config.history_refresh_seconds = env_u64(
            "OVERLAY_HISTORY_REFRESH_SECONDS",
            config.history_refresh_seconds,
        );
        config.settings_watch_seconds = env_u64(
            "OVERLAY_SETTINGS_WATCH_SECONDS",
            config.settings_watch_seconds,
        );
        config.default_message_duration_secs = env_f64(
            "OVERLAY_DEFAULT_MESSAGE_DURATION_SECONDS",
            config.default_message_duration_secs,
        );

        config
    }

    /// Playback poll interval as a [`Duration`].
    #[must_use]
    pub const fn playback_poll_interval(&self) -> Duration {
        Duration::from_secs(self.playback_poll_seconds)
    }

    /// History refresh interval as a [`Duration`].
    #[must_use]
    pub const fn history_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.history_refresh_seconds)
    }

    /// Settings watch interval as a [`Duration`].
    #[must_use]
    pub const fn settings_watch_interval(&self) -> Duration {
        Duration::from_secs(self.settings_watch_seconds)
    }
}

/// Read a value from the process environment. Empty values count as unset.
#[must_use]
pub fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env_value(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}
