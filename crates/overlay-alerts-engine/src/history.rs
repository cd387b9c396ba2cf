//! History view controller.
//!
//! Feeds the virtualized list from the unfiltered alert fetch, applies the
//! hide-test-alerts filter client-side, and owns the row height cache
//! exclusively: rendered rows only report `measured(index, height)` after
//! their own layout pass. Because the cache is index-keyed, any change to
//! the rendered id sequence (new rows, filter toggles) drops every
//! measurement; the next layout pass repopulates it.
//!
//! History filtering never affects playback queue membership: the playback
//! path fetches independently.

use overlay_alerts_core::{Alert, VirtualList};

use crate::source::AlertSource;

/// What the external renderer should show around the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLoadState {
    /// Initial fetch still outstanding: show a loading indicator.
    Loading,
    /// Fetch succeeded but nothing to show: "No alerts yet...".
    Empty,
    /// Rows available.
    Ready,
}

/// One renderable row of the visible window.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub index: usize,
    /// Absolute top offset within the virtual list.
    pub top: f32,
    pub height: f32,
    pub alert: Alert,
}

/// Scrollable history of alerts for one overlay, newest first.
pub struct HistoryView<S: AlertSource> {
    source: S,
    overlay_id: String,
    hide_test_alerts: bool,
    /// Last successful unfiltered fetch, newest first.
    fetched: Vec<Alert>,
    /// Currently rendered (filtered) alerts.
    rendered: Vec<Alert>,
    list: VirtualList,
    loaded: bool,
}

impl<S: AlertSource> HistoryView<S> {
    #[must_use]
    pub fn new(source: S, overlay_id: impl Into<String>) -> Self {
        Self {
            source,
            overlay_id: overlay_id.into(),
            hide_test_alerts: false,
            fetched: Vec::new(),
            rendered: Vec::new(),
            list: VirtualList::new(),
            loaded: false,
        }
    }

    #[must_use]
    pub fn load_state(&self) -> HistoryLoadState {
        if !self.loaded {
            HistoryLoadState::Loading
        } else if self.rendered.is_empty() {
            HistoryLoadState::Empty
        } else {
            HistoryLoadState::Ready
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rendered.len()
    }

    /// Toggle the client-side test-alert filter and re-render from the last
    /// fetch without waiting for the next refresh.
    pub fn set_hide_test_alerts(&mut self, hidden: bool) {
        if self.hide_test_alerts != hidden {
            self.hide_test_alerts = hidden;
            self.apply_filter();
        }
    }

    /// Re-fetch the full history. A failed refresh keeps the previous rows
    /// (silent degrade; the view runs unattended for hours).
    pub fn refresh(&mut self) {
        match self.source.fetch_all(&self.overlay_id, None) {
            Ok(alerts) => {
                self.fetched = alerts;
                self.loaded = true;
                self.apply_filter();
            }
            Err(err) => {
                tracing::debug!(overlay_id = %self.overlay_id, "history refresh failed: {err}");
            }
        }
    }

    /// Viewport height as observed by the renderer's layout pass.
    pub fn set_viewport_height(&mut self, height: f32) {
        self.list.set_viewport_height(height);
    }

    pub fn set_scroll_offset(&mut self, offset: f32) {
        self.list.set_scroll_offset(offset);
    }

    /// A rendered row reported its measured height.
    pub fn measured(&mut self, index: usize, height: f32) {
        self.list.record_measurement(index, height);
    }

    /// Total virtual height of the history content.
    pub fn total_height(&mut self) -> f32 {
        self.list.total_height()
    }

    /// The windowed subset of rows the renderer should mount.
    pub fn visible_rows(&mut self) -> Vec<HistoryRow> {
        self.list
            .visible_rows()
            .into_iter()
            .filter_map(|slot| {
                self.rendered.get(slot.index).map(|alert| HistoryRow {
                    index: slot.index,
                    top: slot.top,
                    height: slot.height,
                    alert: alert.clone(),
                })
            })
            .collect()
    }

    fn apply_filter(&mut self) {
        let rendered: Vec<Alert> = self
            .fetched
            .iter()
            .filter(|alert| !(self.hide_test_alerts && alert.payload.is_test))
            .cloned()
            .collect();

        // Index-keyed heights describe positions, not identities: any change
        // to the rendered id sequence invalidates every measurement.
        let order_changed = rendered.len() != self.rendered.len()
            || rendered
                .iter()
                .zip(self.rendered.iter())
                .any(|(a, b)| a.id != b.id);

        self.rendered = rendered;
        if order_changed {
            self.list.set_item_count(self.rendered.len());
            self.list.invalidate_all();
        }
    }
}
