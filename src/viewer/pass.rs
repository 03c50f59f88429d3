//! Seams between a [`GridView`](super::GridView) and its host: where the
//! grid's data comes from and who paints it.

use crate::layout::{GridMetrics, ViewportRange};
use crate::render::DirtyState;
use crate::types::CellRange;

/// Geometry plus the live view inputs the widget reads before each pass.
pub trait GridSource: GridMetrics {
    /// Scroll offset `(x, y)` in pixels, measured from the freeze boundary.
    fn scroll(&self) -> (f64, f64);

    /// Visible area `(width, height)` in pixels.
    fn view_size(&self) -> (f64, f64);

    /// Frozen `(rows, cols)`.
    fn freeze(&self) -> (u32, u32) {
        (0, 0)
    }
}

/// How much of the surface a pass must repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepaintMode {
    /// Everything: content, headers, grid and overlays
    Full,
    /// Content inside the range, plus whatever overlays are flagged
    Partial(CellRange),
    /// No cell content; only the flagged overlays (selection, headers, grid)
    Overlays,
}

/// Everything a painter needs for one executed render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    pub mode: RepaintMode,
    pub range: ViewportRange,
    /// Tracker snapshot taken before the pass cleared it
    pub dirty: DirtyState,
}

impl RenderPass {
    pub fn is_full(&self) -> bool {
        self.mode == RepaintMode::Full
    }

    /// Whether the content of cell (ri, ci) must be repainted in this pass.
    pub fn repaints_cell(&self, ri: u32, ci: u32) -> bool {
        match self.mode {
            RepaintMode::Full => true,
            RepaintMode::Partial(range) => range.includes(ri, ci),
            RepaintMode::Overlays => false,
        }
    }
}

/// Receives executed render passes.
pub trait GridPainter {
    fn paint(&mut self, pass: &RenderPass);
}

impl<F: FnMut(&RenderPass)> GridPainter for F {
    fn paint(&mut self, pass: &RenderPass) {
        self(pass);
    }
}
