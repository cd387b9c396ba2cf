//! Core types and logic for Overlay Alerts
//!
//! This crate provides:
//! - Data models (`Alert`, `AlertPayload`, `OverlaySettings`)
//! - The playback queue state machine (`PlaybackQueue`)
//! - Variable-height list virtualization (`VirtualList`)
//! - Configuration and common error types
//!
//! Everything here is pure logic: no I/O, no timers, no rendering surface.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod models;
pub mod money;
pub mod playback;
pub mod timestamps;
pub mod virtual_list;

// Re-export key types for convenience
pub use config::{Config, env_value};
pub use error::{Error, Result};
pub use models::{
    Alert, AlertKind, AlertPayload, MessageAnimation, MessagePosition, OverlaySettings,
    new_event_id,
};
pub use money::format_money;
pub use playback::{Phase, PlaybackQueue, REMOVE_ANIMATION, Transition};
pub use timestamps::{micros_to_naive, naive_to_micros, now_micros};
pub use virtual_list::{MIN_ROW_HEIGHT, ROW_SPACING, RowSlot, VirtualList};
