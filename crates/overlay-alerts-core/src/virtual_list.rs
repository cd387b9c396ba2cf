//! Variable-height list virtualization.
//!
//! Renders only the rows intersecting the current viewport from a collection
//! whose individual row heights are unknown until first render. Rows report
//! their own measured height after layout via [`VirtualList::record_measurement`];
//! until then a minimum row height stands in. The cache is index-keyed, so a
//! length or order change in the underlying collection invalidates it
//! wholesale; re-measurement repopulates it within one layout pass.
//!
//! The engine is UI-agnostic: callers provide the viewport height and scroll
//! offset and receive absolute row offsets back.

/// Row height assumed before a row has been measured.
pub const MIN_ROW_HEIGHT: f32 = 50.0;

/// Vertical gap added below each measured row.
pub const ROW_SPACING: f32 = 5.0;

/// Extra rows rendered beyond each edge of the viewport.
const OVERSCAN_ROWS: usize = 1;

/// One row of the visible window, positioned by cumulative offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSlot {
    pub index: usize,
    /// Absolute top offset within the full (virtual) list.
    pub top: f32,
    pub height: f32,
}

/// Windowed layout engine over an ordered collection of unknown-height rows.
#[derive(Debug)]
pub struct VirtualList {
    item_count: usize,
    viewport_height: f32,
    scroll_offset: f32,
    min_row_height: f32,
    row_spacing: f32,
    /// Index-keyed measured heights; `None` until the row reports one.
    measured: Vec<Option<f32>>,
    /// offsets[i] = top of row i; offsets[item_count] = total height.
    offsets: Vec<f32>,
    /// First offset entry that no longer reflects the measurements.
    dirty_from: usize,
}

impl Default for VirtualList {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualList {
    #[must_use]
    pub fn new() -> Self {
        Self::with_metrics(MIN_ROW_HEIGHT, ROW_SPACING)
    }

    #[must_use]
    pub fn with_metrics(min_row_height: f32, row_spacing: f32) -> Self {
        Self {
            item_count: 0,
            viewport_height: 0.0,
            scroll_offset: 0.0,
            min_row_height,
            row_spacing,
            measured: Vec::new(),
            offsets: vec![0.0],
            dirty_from: 0,
        }
    }

    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    /// Replace the collection length. Any change drops every cached
    /// measurement: the cache is keyed by index, not item identity, so the
    /// old heights may describe the wrong rows.
    pub fn set_item_count(&mut self, item_count: usize) {
        if item_count != self.item_count {
            self.item_count = item_count;
            self.invalidate_all();
        }
    }

    /// Drop all measurements (collection re-ordered or filtered in place).
    pub fn invalidate_all(&mut self) {
        self.measured.clear();
        self.measured.resize(self.item_count, None);
        self.dirty_from = 0;
    }

    /// Viewport height as observed by the layout pass.
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(0.0);
    }

    /// Scroll position, clamped to the scrollable range.
    pub fn set_scroll_offset(&mut self, offset: f32) {
        let max_offset = (self.total_height() - self.viewport_height).max(0.0);
        self.scroll_offset = offset.clamp(0.0, max_offset);
    }

    /// A row reported its rendered height. Offsets for every row from this
    /// index onward are invalidated; rows above are unaffected.
    pub fn record_measurement(&mut self, index: usize, height: f32) {
        if index >= self.item_count || !height.is_finite() || height < 0.0 {
            return;
        }
        if self.measured[index] == Some(height) {
            return;
        }
        self.measured[index] = Some(height);
        self.dirty_from = self.dirty_from.min(index);
    }

    /// Effective height of one row: measured height plus spacing once a
    /// measurement exists, the minimum row height otherwise.
    #[must_use]
    pub fn row_height(&self, index: usize) -> f32 {
        self.measured
            .get(index)
            .copied()
            .flatten()
            .map_or(self.min_row_height, |h| h + self.row_spacing)
    }

    /// Total virtual height of the collection. Zero when empty.
    pub fn total_height(&mut self) -> f32 {
        self.ensure_offsets();
        *self.offsets.last().unwrap_or(&0.0)
    }

    /// Absolute top offset of one row.
    pub fn offset_for_index(&mut self, index: usize) -> f32 {
        self.ensure_offsets();
        self.offsets.get(index).copied().unwrap_or(0.0)
    }

    /// The windowed subset of rows intersecting the viewport, each with its
    /// absolute top offset, plus one overscan row on each edge. Empty when
    /// the collection is empty or the viewport has no extent.
    pub fn visible_rows(&mut self) -> Vec<RowSlot> {
        if self.item_count == 0 || self.viewport_height <= 0.0 {
            return Vec::new();
        }
        self.ensure_offsets();

        let window_top = self.scroll_offset;
        let window_bottom = self.scroll_offset + self.viewport_height;

        // First row whose bottom edge crosses the window top.
        let first = self
            .offsets
            .partition_point(|&top| top <= window_top)
            .saturating_sub(1)
            .min(self.item_count - 1);

        let mut rows = Vec::new();
        let start = first.saturating_sub(OVERSCAN_ROWS);
        let mut index = start;
        let mut overscan_below = 0;
        while index < self.item_count {
            let top = self.offsets[index];
            if top >= window_bottom {
                overscan_below += 1;
                if overscan_below > OVERSCAN_ROWS {
                    break;
                }
            }
            rows.push(RowSlot {
                index,
                top,
                height: self.row_height(index),
            });
            index += 1;
        }
        rows
    }

    fn ensure_offsets(&mut self) {
        // dirty_from past the end means the offsets are fully clean.
        if self.offsets.len() == self.item_count + 1 && self.dirty_from > self.item_count {
            return;
        }
        self.offsets.resize(self.item_count + 1, 0.0);

        let start = self.dirty_from.min(self.item_count);
        let mut running = self.offsets[start];
        if start == 0 {
            running = 0.0;
            self.offsets[0] = 0.0;
        }
        for index in start..self.item_count {
            running += self.row_height(index);
            self.offsets[index + 1] = running;
        }
        self.dirty_from = self.item_count + 1;
    }
}
