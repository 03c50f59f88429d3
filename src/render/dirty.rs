//! Invalidation bookkeeping between render passes.
//!
//! The tracker records everything that changed since the last clear so the
//! renderer can choose between a full and a partial repaint. It may
//! over-report (merged regions cover the rectangle between two edits) but
//! never under-reports.

use serde::Serialize;
use web_time::Instant;

use crate::types::CellRange;

/// Region count above which the tracker gives up on partial bookkeeping and
/// escalates to a full redraw.
pub const MAX_DIRTY_REGIONS: usize = 50;

/// What a dirty region stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirtyKind {
    /// Full redraw; supersedes everything else
    All,
    /// Specific cells changed
    Cells,
    /// Entire rows changed
    Rows,
    /// Entire columns changed
    Cols,
    /// Selection overlay changed
    Selection,
    /// Scroll offset changed; every cell moved on screen
    Scroll,
    /// Grid lines changed
    Grid,
    /// Row/column headers changed
    Headers,
}

/// A recorded area (or rangeless scope) that needs repainting.
#[derive(Debug, Clone, PartialEq)]
pub struct DirtyRegion {
    pub kind: DirtyKind,
    /// `None` only for [`DirtyKind::Scroll`] regions.
    pub range: Option<CellRange>,
    pub timestamp: Instant,
}

/// Read-only snapshot of a [`DirtyTracker`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirtyState {
    pub is_dirty: bool,
    pub needs_full_redraw: bool,
    pub regions: Vec<DirtyRegion>,
    pub selection_dirty: bool,
    pub headers_dirty: bool,
    pub grid_dirty: bool,
}

impl DirtyState {
    /// Whether any recorded region is a rangeless scroll region.
    pub fn has_scroll(&self) -> bool {
        self.regions.iter().any(|r| r.kind == DirtyKind::Scroll)
    }
}

/// Tracks which regions of the grid need to be redrawn.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    regions: Vec<DirtyRegion>,
    full_redraw: bool,
    selection_dirty: bool,
    headers_dirty: bool,
    grid_dirty: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the entire surface dirty (full redraw).
    pub fn mark_all(&mut self) {
        self.full_redraw = true;
        self.regions.clear();
        self.selection_dirty = true;
        self.headers_dirty = true;
        self.grid_dirty = true;
    }

    pub fn mark_cell(&mut self, ri: u32, ci: u32) {
        self.mark_range(CellRange::cell(ri, ci));
    }

    pub fn mark_range(&mut self, range: CellRange) {
        if self.full_redraw {
            return;
        }
        self.add_region(DirtyKind::Cells, Some(range));
    }

    /// Mark rows `start..=end` across every column; headers follow.
    pub fn mark_rows(&mut self, start: u32, end: u32) {
        if self.full_redraw {
            return;
        }
        self.add_region(DirtyKind::Rows, Some(CellRange::rows(start, end)));
        self.headers_dirty = true;
    }

    /// Mark columns `start..=end` across every row; headers follow.
    pub fn mark_cols(&mut self, start: u32, end: u32) {
        if self.full_redraw {
            return;
        }
        self.add_region(DirtyKind::Cols, Some(CellRange::cols(start, end)));
        self.headers_dirty = true;
    }

    pub fn mark_selection(&mut self) {
        self.selection_dirty = true;
    }

    pub fn mark_grid(&mut self) {
        self.grid_dirty = true;
    }

    pub fn mark_headers(&mut self) {
        self.headers_dirty = true;
    }

    /// Mark the scroll offset as changed; every cell query reports dirty
    /// until the next clear.
    pub fn mark_scroll(&mut self) {
        if self.full_redraw {
            return;
        }
        self.add_region(DirtyKind::Scroll, None);
        self.headers_dirty = true;
    }

    /// Snapshot of the current state (regions copied).
    pub fn state(&self) -> DirtyState {
        DirtyState {
            is_dirty: self.is_dirty(),
            needs_full_redraw: self.full_redraw,
            regions: self.regions.clone(),
            selection_dirty: self.selection_dirty,
            headers_dirty: self.headers_dirty,
            grid_dirty: self.grid_dirty,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.full_redraw
            || !self.regions.is_empty()
            || self.selection_dirty
            || self.headers_dirty
            || self.grid_dirty
    }

    pub fn needs_full_redraw(&self) -> bool {
        self.full_redraw
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn is_cell_dirty(&self, ri: u32, ci: u32) -> bool {
        self.full_redraw
            || self.regions.iter().any(|region| match region.range {
                Some(range) => range.includes(ri, ci),
                None => true,
            })
    }

    pub fn is_range_dirty(&self, range: &CellRange) -> bool {
        self.full_redraw
            || self.regions.iter().any(|region| match region.range {
                Some(dirty) => dirty.intersects(range),
                None => true,
            })
    }

    /// Bounding box of all ranged regions.
    ///
    /// `None` when a full redraw is pending or nothing ranged was recorded.
    pub fn dirty_bounds(&self) -> Option<CellRange> {
        if self.full_redraw {
            return None;
        }
        self.regions
            .iter()
            .filter_map(|region| region.range)
            .reduce(|acc, range| acc.union(&range))
    }

    /// Reset everything; called by the renderer after a completed pass.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.full_redraw = false;
        self.selection_dirty = false;
        self.headers_dirty = false;
        self.grid_dirty = false;
    }

    pub fn clear_selection(&mut self) {
        self.selection_dirty = false;
    }

    pub fn clear_headers(&mut self) {
        self.headers_dirty = false;
    }

    pub fn clear_grid(&mut self) {
        self.grid_dirty = false;
    }

    /// Merge into an intersecting region of the same kind, else append.
    fn add_region(&mut self, kind: DirtyKind, range: Option<CellRange>) {
        let now = Instant::now();
        let existing = self.regions.iter_mut().find(|region| {
            region.kind == kind
                && match (region.range, range) {
                    (Some(have), Some(new)) => have.intersects(&new),
                    (None, None) => true,
                    _ => false,
                }
        });
        if let Some(region) = existing {
            if let (Some(have), Some(new)) = (region.range, range) {
                region.range = Some(have.union(&new));
            }
            region.timestamp = now;
            return;
        }

        if self.regions.len() >= MAX_DIRTY_REGIONS {
            tracing::debug!(
                target: "gridframe.dirty",
                regions = self.regions.len(),
                "region_cap_reached_full_redraw"
            );
            self.mark_all();
            return;
        }

        self.regions.push(DirtyRegion {
            kind,
            range,
            timestamp: now,
        });
    }
}
