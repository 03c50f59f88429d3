//! `GridView` - the widget-side owner of the render pipeline.
//!
//! A view wires one [`Viewport`], one [`DirtyTracker`] and one
//! [`SharedScheduler`] together:
//! - data and interaction changes mark the tracker and schedule a frame
//! - the scheduler coalesces them into one executed render per frame
//! - the executed render picks full, partial or overlay-only repaint,
//!   clears the tracker and hands a [`RenderPass`] to the painter
//!
//! Nothing is shared between views.

mod pass;
mod scroll;
#[cfg(target_arch = "wasm32")]
mod wasm;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::layout::{Viewport, ViewportConfig, ViewportRange};
use crate::render::{Debounce, DirtyState, DirtyTracker, RenderPriority, SharedScheduler};
use crate::types::CellRange;

pub use pass::{GridPainter, GridSource, RenderPass, RepaintMode};
#[cfg(target_arch = "wasm32")]
pub use wasm::JsGridView;

/// Task id for selection overlay repaints.
pub const SELECTION_TASK_ID: &str = "selection";

/// Construction-time options for a [`GridView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridViewConfig {
    pub viewport: ViewportConfig,
    /// Quiet period after the last scroll before a full settle pass
    pub settle_delay_ms: u64,
}

impl Default for GridViewConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            settle_delay_ms: scroll::SCROLL_SETTLE_DELAY_MS,
        }
    }
}

/// State touched by the executed render. Lives behind an `Rc` so the
/// scheduler's render callback can reach it through a `Weak`.
struct ViewState<S> {
    viewport: Viewport<S>,
    dirty: DirtyTracker,
    passes: u64,
}

impl<S: GridSource> ViewState<S> {
    /// Pull scroll, size and freeze from the source. Unchanged inputs keep
    /// the cached range.
    fn sync_viewport(&mut self) {
        let (x, y) = self.viewport.metrics().scroll();
        let (width, height) = self.viewport.metrics().view_size();
        let (rows, cols) = self.viewport.metrics().freeze();
        self.viewport.set_scroll(x, y);
        self.viewport.set_view_size(width, height);
        self.viewport.set_freeze(rows, cols);
    }

    /// Build the pass for the current dirty state and clear the tracker.
    fn take_pass(&mut self) -> Option<RenderPass> {
        self.sync_viewport();
        if !self.dirty.is_dirty() {
            tracing::trace!(target: "gridframe.view", "render_skipped_clean");
            return None;
        }

        let range = self.viewport.range();
        let dirty = self.dirty.state();
        let mode = if dirty.needs_full_redraw || dirty.has_scroll() {
            RepaintMode::Full
        } else {
            self.dirty
                .dirty_bounds()
                .and_then(|bounds| self.clip_to_painted(bounds, range))
                .map_or(RepaintMode::Overlays, RepaintMode::Partial)
        };

        tracing::debug!(
            target: "gridframe.view",
            mode = ?mode,
            regions = dirty.regions.len(),
            sri = range.sri,
            eri = range.eri,
            "render_pass"
        );
        self.dirty.clear();
        Some(RenderPass { mode, range, dirty })
    }

    /// Bounding box of the part of `bounds` that lands on a painted pane:
    /// the scrolled range, the frozen rows above it and the frozen columns
    /// beside it.
    fn clip_to_painted(&self, bounds: CellRange, range: ViewportRange) -> Option<CellRange> {
        let (freeze_rows, freeze_cols) = self.viewport.freeze();
        let top = if freeze_rows > 0 { 0 } else { range.sri };
        let left = if freeze_cols > 0 { 0 } else { range.sci };
        let frozen_rows = (freeze_rows > 0)
            .then(|| CellRange::new(0, left, freeze_rows.saturating_sub(1), range.eci));
        let frozen_cols = (freeze_cols > 0)
            .then(|| CellRange::new(top, 0, range.eri, freeze_cols.saturating_sub(1)));

        [Some(range.cells()), frozen_rows, frozen_cols]
            .into_iter()
            .flatten()
            .filter_map(|pane| bounds.intersection(&pane))
            .reduce(|a, b| a.union(&b))
    }
}

/// Executed render: the pass is taken under a short state borrow, then
/// painted with the state released so the painter may call back into the
/// view. A nested forced render that finds the painter busy is folded into
/// a full redraw for the next frame.
fn execute<S: GridSource, P: GridPainter>(state: &RefCell<ViewState<S>>, painter: &RefCell<P>) {
    let pass = state.borrow_mut().take_pass();
    let Some(pass) = pass else {
        return;
    };
    match painter.try_borrow_mut() {
        Ok(mut painter) => {
            painter.paint(&pass);
            drop(painter);
            let mut state = state.borrow_mut();
            state.passes = state.passes.saturating_add(1);
        }
        Err(_) => {
            tracing::warn!(target: "gridframe.view", "painter_busy");
            state.borrow_mut().dirty.mark_all();
        }
    }
}

/// A virtualized grid widget: viewport, dirty tracking and frame scheduling
/// for one surface.
pub struct GridView<S, P> {
    state: Rc<RefCell<ViewState<S>>>,
    painter: Rc<RefCell<P>>,
    scheduler: SharedScheduler,
    settle: Debounce,
}

impl<S, P> GridView<S, P>
where
    S: GridSource + 'static,
    P: GridPainter + 'static,
{
    /// View driven by a host-pumped scheduler.
    pub fn new(source: S, painter: P, config: GridViewConfig) -> Self {
        Self::with_scheduler(source, painter, config, SharedScheduler::default())
    }

    /// View driven by `scheduler`, whose render callback it takes over.
    ///
    /// Everything starts dirty; the first executed frame is a full pass.
    pub fn with_scheduler(
        source: S,
        painter: P,
        config: GridViewConfig,
        scheduler: SharedScheduler,
    ) -> Self {
        let mut dirty = DirtyTracker::new();
        dirty.mark_all();
        let mut state = ViewState {
            viewport: Viewport::new(config.viewport, source),
            dirty,
            passes: 0,
        };
        state.sync_viewport();

        let state = Rc::new(RefCell::new(state));
        let painter = Rc::new(RefCell::new(painter));
        let weak_state = Rc::downgrade(&state);
        let weak_painter = Rc::downgrade(&painter);
        scheduler.set_render_callback(move || {
            if let (Some(state), Some(painter)) = (weak_state.upgrade(), weak_painter.upgrade()) {
                execute(&state, &painter);
            }
        });

        Self {
            state,
            painter,
            scheduler,
            settle: Debounce::new(Duration::from_millis(config.settle_delay_ms)),
        }
    }

    /// Sync the viewport inputs and schedule a frame.
    pub fn render(&self) {
        self.state.borrow_mut().sync_viewport();
        self.scheduler.schedule();
    }

    /// Sync the viewport inputs and render synchronously, discarding
    /// pending tasks.
    pub fn render_now(&self) {
        self.state.borrow_mut().sync_viewport();
        self.scheduler.render_now();
    }

    pub fn mark_cells_dirty(&self, range: CellRange) {
        self.state.borrow_mut().dirty.mark_range(range);
        self.scheduler.schedule();
    }

    /// Flag the selection overlay and queue it ahead of other frame work.
    pub fn mark_selection_dirty(&self) {
        self.state.borrow_mut().dirty.mark_selection();
        self.scheduler
            .schedule_task(SELECTION_TASK_ID, RenderPriority::High, || {});
    }

    /// Replace the data source. Everything is repainted.
    pub fn reset_data(&self, source: S) {
        {
            let mut state = self.state.borrow_mut();
            state.viewport.set_metrics(source);
            state.dirty.mark_all();
        }
        self.render();
    }

    /// Mutate the source in place (sizes, hidden lines, totals); the
    /// viewport recomputes on the next pass.
    pub fn with_source_mut<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut state = self.state.borrow_mut();
        let result = f(state.viewport.metrics_mut());
        state.sync_viewport();
        result
    }

    pub fn with_source<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(self.state.borrow().viewport.metrics())
    }

    /// Host refresh entry point.
    pub fn on_frame(&self, timestamp_ms: f64) {
        self.scheduler.fire(timestamp_ms);
    }

    pub fn is_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn fps(&self) -> u32 {
        self.scheduler.fps()
    }

    /// Current realized range, recomputed from the source if needed.
    pub fn viewport_range(&self) -> ViewportRange {
        let mut state = self.state.borrow_mut();
        state.sync_viewport();
        state.viewport.range()
    }

    pub fn dirty_state(&self) -> DirtyState {
        self.state.borrow().dirty.state()
    }

    /// Number of passes handed to the painter so far.
    pub fn pass_count(&self) -> u64 {
        self.state.borrow().passes
    }

    pub fn scheduler(&self) -> &SharedScheduler {
        &self.scheduler
    }

    /// Access the painter between passes. Not callable from inside a paint.
    pub fn with_painter<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut *self.painter.borrow_mut())
    }

    /// Cancel pending frames and the settle pass, and detach from the
    /// scheduler.
    pub fn destroy(&mut self) {
        self.settle.cancel();
        self.scheduler.destroy();
    }
}

impl<S, P> fmt::Debug for GridView<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridView")
            .field("scheduler", &self.scheduler)
            .field("settle_armed", &self.settle.is_armed())
            .finish_non_exhaustive()
    }
}
