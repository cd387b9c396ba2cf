//! Engine layer for Overlay Alerts
//!
//! This crate provides the I/O-facing glue around the core state machines:
//! - The fetch/acknowledge boundary (`AlertSource`, `StoreSource`)
//! - The background playback driver (`PlaybackDriver`)
//! - The settings change watcher (`subscribe`)
//! - The history view controller (`HistoryView`)
//! - The renderer-facing state bridge (`OverlayState`)

#![forbid(unsafe_code)]

pub mod driver;
pub mod history;
pub mod settings;
pub mod source;
pub mod state;

pub use driver::{PlaybackDriver, PlaybackDriverHandle};
pub use history::{HistoryLoadState, HistoryRow, HistoryView};
pub use settings::{SettingsSubscription, subscribe};
pub use source::{AlertSource, StoreSource};
pub use state::{CurrentAlert, OverlayState, PlaybackEvent};
