//! Shared overlay state consumed by an external renderer.
//!
//! The playback driver is the only writer of the current-alert snapshot;
//! the settings watcher is the only writer of the settings cell. Renderers
//! read snapshots and drain the bounded event ring at their own cadence.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use overlay_alerts_core::{Alert, OverlaySettings};

/// Max playback events buffered before the oldest are dropped.
const EVENT_RING_CAPACITY: usize = 256;

/// One renderer-facing playback transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    Shown { alert: Alert },
    RemovalStarted { alert_id: String },
    Cleared { alert_id: String },
    Acknowledged { alert_id: String },
    AcknowledgeFailed { alert_id: String },
}

/// What the renderer needs for the single-alert display surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentAlert {
    pub alert: Option<Alert>,
    /// Exit flag: true while the exit animation is in flight.
    pub is_removing: bool,
}

/// Snapshot-and-ring bridge between the driver threads and a renderer.
#[derive(Debug, Default)]
pub struct OverlayState {
    current: Mutex<CurrentAlert>,
    settings: Mutex<Option<OverlaySettings>>,
    events: Mutex<VecDeque<PlaybackEvent>>,
}

impl OverlayState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current alert + exit flag, as last published by the driver.
    #[must_use]
    pub fn current(&self) -> CurrentAlert {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update_current(&self, alert: Option<Alert>, is_removing: bool) {
        let mut guard = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = CurrentAlert { alert, is_removing };
    }

    /// Last settings document delivered by the watcher, if any yet.
    #[must_use]
    pub fn settings(&self) -> Option<OverlaySettings> {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update_settings(&self, settings: OverlaySettings) {
        let mut guard = self
            .settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(settings);
    }

    /// Append one event, dropping the oldest beyond capacity so an
    /// unattended renderer can never grow the buffer unbounded.
    pub fn push_event(&self, event: PlaybackEvent) {
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if events.len() >= EVENT_RING_CAPACITY {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Drain everything buffered since the last call, oldest first.
    pub fn drain_events(&self) -> Vec<PlaybackEvent> {
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        events.drain(..).collect()
    }
}
