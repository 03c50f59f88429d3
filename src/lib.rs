//! gridframe - render coordination for virtualized spreadsheet grids
//!
//! Decides what to draw and when, for grids of 100k+ cells:
//! - Viewport virtualization with frozen panes, hidden lines and a buffer
//! - Dirty-region tracking with merging and full-redraw escalation
//! - Frame-aligned batching of repaint requests with task priorities
//! - A `GridView` that wires the three together for one surface
//!
//! Painting itself is left to the host through the `GridPainter` trait.
//!
//! # Usage (Rust)
//!
//! ```
//! use gridframe::layout::{FnMetrics, Viewport, ViewportConfig};
//!
//! let metrics = FnMetrics::new(|_| 25.0, |_| 100.0, || 1000, || 26);
//! let mut viewport = Viewport::new(ViewportConfig::default(), metrics);
//! viewport.set_view_size(800.0, 600.0);
//! let range = viewport.range();
//! assert_eq!((range.sri, range.eri), (0, 29));
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { JsGridView } from 'gridframe';
//! await init();
//! const view = new JsGridView(rowHeight, colWidth, rows, cols, paint);
//! view.setViewSize(width, height);
//! ```

pub mod cell_ref;
pub mod error;
pub mod layout;
pub mod render;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use error::{GridError, Result};
pub use layout::{GridMetrics, Viewport, ViewportConfig, ViewportRange};
pub use render::{DirtyTracker, RenderPriority, RenderScheduler, SharedScheduler};
pub use types::CellRange;
pub use viewer::{GridPainter, GridSource, GridView, GridViewConfig, RenderPass, RepaintMode};

#[cfg(target_arch = "wasm32")]
pub use viewer::JsGridView;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
