//! Visible-range computation over scroll, size and freeze state.
//!
//! The viewport answers one question: which row/column indices must be
//! materialized to cover the visible pixel area plus a safety buffer.
//! Scroll offsets are measured from the freeze boundary, so `(0, 0)` shows
//! the first scrollable row and column right after the frozen panes.
//!
//! The computed [`ViewportRange`] is cached and only recomputed after an
//! input that actually changed, or after [`Viewport::invalidate`].

use serde::{Deserialize, Serialize};

use super::GridMetrics;
use crate::types::CellRange;

/// Buffer configuration for a [`Viewport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    /// Extra rows realized above and below the visible area
    pub row_buffer: u32,
    /// Extra columns realized left and right of the visible area
    pub col_buffer: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            row_buffer: 5,
            col_buffer: 3,
        }
    }
}

/// Inclusive index range to render plus the pixel size of that span.
///
/// Invariants: `sri <= eri`, `sci <= eci`, `sri >= freeze_rows`,
/// `sci >= freeze_cols`. An empty axis collapses to `start == end ==
/// freeze` with a zero pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRange {
    pub sri: u32,
    pub sci: u32,
    pub eri: u32,
    pub eci: u32,
    /// Sum of visible column widths over `sci..=eci`
    pub width: f64,
    /// Sum of visible row heights over `sri..=eri`
    pub height: f64,
}

impl ViewportRange {
    pub fn contains(&self, ri: u32, ci: u32) -> bool {
        self.contains_row(ri) && self.contains_col(ci)
    }

    pub fn contains_row(&self, ri: u32) -> bool {
        self.sri <= ri && ri <= self.eri
    }

    pub fn contains_col(&self, ci: u32) -> bool {
        self.sci <= ci && ci <= self.eci
    }

    /// The scrollable index rectangle as a [`CellRange`].
    pub fn cells(&self) -> CellRange {
        CellRange::new(self.sri, self.sci, self.eri, self.eci)
    }
}

/// Result of a position lookup: the index under the position and the offset of
/// that index's leading edge, both relative to the freeze boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisHit {
    pub index: u32,
    pub offset: f64,
}

/// A realized cell passed to [`Viewport::each_visible_cell`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleCell {
    pub ri: u32,
    pub ci: u32,
    /// Running x offset from the range's left edge
    pub x: f64,
    /// Running y offset from the range's top edge
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A realized row or column passed to [`Viewport::each_visible_row`] and
/// [`Viewport::each_visible_col`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleLine {
    pub index: u32,
    pub offset: f64,
    pub size: f64,
}

/// Viewport state - tracks the inputs and caches the realized range
#[derive(Debug)]
pub struct Viewport<M> {
    config: ViewportConfig,
    metrics: M,
    scroll_x: f64,
    scroll_y: f64,
    view_width: f64,
    view_height: f64,
    freeze_rows: u32,
    freeze_cols: u32,
    range: Option<ViewportRange>,
    stale: bool,
    revision: u64,
}

impl<M: GridMetrics> Viewport<M> {
    /// Create a viewport with zero scroll, zero size and no frozen panes.
    pub fn new(config: ViewportConfig, metrics: M) -> Self {
        Self {
            config,
            metrics,
            scroll_x: 0.0,
            scroll_y: 0.0,
            view_width: 0.0,
            view_height: 0.0,
            freeze_rows: 0,
            freeze_cols: 0,
            range: None,
            stale: true,
            revision: 0,
        }
    }

    pub fn config(&self) -> ViewportConfig {
        self.config
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// Mutable access to the geometry; the cached range is invalidated.
    pub fn metrics_mut(&mut self) -> &mut M {
        self.stale = true;
        &mut self.metrics
    }

    /// Replace the geometry source (e.g. on sheet switch).
    pub fn set_metrics(&mut self, metrics: M) {
        self.metrics = metrics;
        self.stale = true;
    }

    pub fn scroll(&self) -> (f64, f64) {
        (self.scroll_x, self.scroll_y)
    }

    pub fn view_size(&self) -> (f64, f64) {
        (self.view_width, self.view_height)
    }

    pub fn freeze(&self) -> (u32, u32) {
        (self.freeze_rows, self.freeze_cols)
    }

    /// Number of times the range has been recomputed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Update the scroll offset. No-op when unchanged.
    pub fn set_scroll(&mut self, x: f64, y: f64) {
        if changed(self.scroll_x, x) || changed(self.scroll_y, y) {
            self.scroll_x = x;
            self.scroll_y = y;
            self.stale = true;
        }
    }

    /// Update the visible pixel size. No-op when unchanged.
    pub fn set_view_size(&mut self, width: f64, height: f64) {
        if changed(self.view_width, width) || changed(self.view_height, height) {
            self.view_width = width;
            self.view_height = height;
            self.stale = true;
        }
    }

    /// Update the frozen pane boundaries. No-op when unchanged.
    pub fn set_freeze(&mut self, rows: u32, cols: u32) {
        if self.freeze_rows != rows || self.freeze_cols != cols {
            self.freeze_rows = rows;
            self.freeze_cols = cols;
            self.stale = true;
        }
    }

    /// Force recomputation on the next read.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// The realized range, recomputed only when stale.
    pub fn range(&mut self) -> ViewportRange {
        match self.range {
            Some(range) if !self.stale => range,
            _ => {
                let range = self.compute_range();
                self.range = Some(range);
                self.stale = false;
                self.revision += 1;
                tracing::trace!(
                    target: "gridframe.viewport",
                    sri = range.sri,
                    sci = range.sci,
                    eri = range.eri,
                    eci = range.eci,
                    revision = self.revision,
                    "range_recomputed"
                );
                range
            }
        }
    }

    pub fn is_visible(&mut self, ri: u32, ci: u32) -> bool {
        self.range().contains(ri, ci)
    }

    pub fn is_row_visible(&mut self, ri: u32) -> bool {
        self.range().contains_row(ri)
    }

    pub fn is_col_visible(&mut self, ci: u32) -> bool {
        self.range().contains_col(ci)
    }

    /// Row under `y` pixels past the freeze boundary.
    ///
    /// Binary search over the metrics' row positions when they keep them,
    /// linear scan otherwise. Both give the same hit.
    pub fn find_row_at_y(&self, y: f64) -> AxisHit {
        let total = self.metrics.total_rows();
        indexed_find(
            self.freeze_rows,
            total,
            y,
            |ri| self.metrics.row_position(ri),
            |at| self.metrics.row_at(at),
        )
        .unwrap_or_else(|| {
            find_at(
                self.freeze_rows,
                total,
                y,
                |ri| self.metrics.row_height(ri),
                |ri| self.metrics.is_row_hidden(ri),
            )
        })
    }

    /// Column under `x` pixels past the freeze boundary.
    pub fn find_col_at_x(&self, x: f64) -> AxisHit {
        let total = self.metrics.total_cols();
        indexed_find(
            self.freeze_cols,
            total,
            x,
            |ci| self.metrics.col_position(ci),
            |at| self.metrics.col_at(at),
        )
        .unwrap_or_else(|| {
            find_at(
                self.freeze_cols,
                total,
                x,
                |ci| self.metrics.col_width(ci),
                |ci| self.metrics.is_col_hidden(ci),
            )
        })
    }

    /// Visit every non-hidden cell of the range in row-major order.
    pub fn each_visible_cell(&mut self, mut f: impl FnMut(VisibleCell)) {
        let range = self.range();
        let cols = self.lines(range.sci, range.eci, Axis::Col);
        let mut y = 0.0;
        for ri in self.realized(range.sri, range.eri, Axis::Row) {
            let height = self.metrics.row_height(ri);
            for col in &cols {
                f(VisibleCell {
                    ri,
                    ci: col.index,
                    x: col.offset,
                    y,
                    width: col.size,
                    height,
                });
            }
            y += height;
        }
    }

    /// Visit every non-hidden row of the range with its running y offset.
    pub fn each_visible_row(&mut self, mut f: impl FnMut(VisibleLine)) {
        let range = self.range();
        for line in self.lines(range.sri, range.eri, Axis::Row) {
            f(line);
        }
    }

    /// Visit every non-hidden column of the range with its running x offset.
    pub fn each_visible_col(&mut self, mut f: impl FnMut(VisibleLine)) {
        let range = self.range();
        for line in self.lines(range.sci, range.eci, Axis::Col) {
            f(line);
        }
    }

    fn compute_range(&self) -> ViewportRange {
        let rows = self.span(Axis::Row);
        let cols = self.span(Axis::Col);
        ViewportRange {
            sri: rows.start,
            sci: cols.start,
            eri: rows.end,
            eci: cols.end,
            width: cols.size,
            height: rows.size,
        }
    }

    fn span(&self, axis: Axis) -> Span {
        let (freeze, total, offset, extent, buffer) = match axis {
            Axis::Row => (
                self.freeze_rows,
                self.metrics.total_rows(),
                self.scroll_y,
                self.view_height,
                self.config.row_buffer,
            ),
            Axis::Col => (
                self.freeze_cols,
                self.metrics.total_cols(),
                self.scroll_x,
                self.view_width,
                self.config.col_buffer,
            ),
        };

        // Nothing scrollable on this axis: collapse onto the freeze boundary.
        if freeze >= total {
            return Span {
                start: freeze,
                end: freeze,
                size: 0.0,
            };
        }

        let first = match axis {
            Axis::Row => self.find_row_at_y(offset).index,
            Axis::Col => self.find_col_at_x(offset).index,
        };
        let start = first.saturating_sub(buffer).max(freeze);

        // The index straddling the far edge is included.
        let mut last = first;
        let mut covered = 0.0;
        for i in first..total {
            if self.hidden(axis, i) {
                continue;
            }
            covered += self.size(axis, i);
            last = i;
            if covered > extent {
                break;
            }
        }
        let end = last.saturating_add(buffer).min(total - 1);

        let size = self
            .realized(start, end, axis)
            .map(|i| self.size(axis, i))
            .sum::<f64>();
        Span { start, end, size }
    }

    fn lines(&self, start: u32, end: u32, axis: Axis) -> Vec<VisibleLine> {
        let mut offset = 0.0;
        self.realized(start, end, axis)
            .map(|index| {
                let size = self.size(axis, index);
                let line = VisibleLine {
                    index,
                    offset,
                    size,
                };
                offset += size;
                line
            })
            .collect()
    }

    /// Non-hidden, in-bounds indices of `start..=end`.
    fn realized(&self, start: u32, end: u32, axis: Axis) -> impl Iterator<Item = u32> + '_ {
        let total = match axis {
            Axis::Row => self.metrics.total_rows(),
            Axis::Col => self.metrics.total_cols(),
        };
        (start..=end)
            .take_while(move |&i| i < total)
            .filter(move |&i| !self.hidden(axis, i))
    }

    fn size(&self, axis: Axis, index: u32) -> f64 {
        match axis {
            Axis::Row => self.metrics.row_height(index),
            Axis::Col => self.metrics.col_width(index),
        }
    }

    fn hidden(&self, axis: Axis, index: u32) -> bool {
        match axis {
            Axis::Row => self.metrics.is_row_hidden(index),
            Axis::Col => self.metrics.is_col_hidden(index),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Row,
    Col,
}

struct Span {
    start: u32,
    end: u32,
    size: f64,
}

fn find_at(
    freeze: u32,
    total: u32,
    at: f64,
    size: impl Fn(u32) -> f64,
    hidden: impl Fn(u32) -> bool,
) -> AxisHit {
    let mut offset = 0.0;
    for index in freeze..total {
        if hidden(index) {
            continue;
        }
        let len = size(index);
        if offset + len > at {
            return AxisHit { index, offset };
        }
        offset += len;
    }
    AxisHit {
        index: total.saturating_sub(1),
        offset,
    }
}

/// Prefix-sum counterpart of [`find_at`]. `None` when the metrics keep no
/// positions or `at` is negative, leaving the scan to decide.
fn indexed_find(
    freeze: u32,
    total: u32,
    at: f64,
    position: impl Fn(u32) -> Option<f64>,
    locate: impl Fn(f64) -> Option<u32>,
) -> Option<AxisHit> {
    if at.is_nan() || at < 0.0 {
        return None;
    }
    let base = position(freeze)?;
    let extent = position(total)?;
    if base + at >= extent {
        return Some(AxisHit {
            index: total.saturating_sub(1),
            offset: extent - base,
        });
    }
    let index = locate(base + at)?.max(freeze);
    Some(AxisHit {
        index,
        offset: position(index)? - base,
    })
}

/// Numeric change test: `0.0` and `-0.0` are the same input, as are two NaNs.
fn changed(old: f64, new: f64) -> bool {
    (old - new).abs() > 0.0 || old.is_nan() != new.is_nan()
}
