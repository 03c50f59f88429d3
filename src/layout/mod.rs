//! Grid geometry and viewport virtualization.
//!
//! This module handles:
//! - The [`GridMetrics`] capability the data model provides
//! - Adapters from closures ([`FnMetrics`]) and sparse size maps ([`SheetLayout`])
//! - Computing the realized row/column range for the current scroll state

mod metrics;
mod sheet_layout;
mod viewport;

pub use metrics::{FnMetrics, GridMetrics};
pub use sheet_layout::{SheetLayout, DEFAULT_COL_WIDTH, DEFAULT_ROW_HEIGHT};
pub use viewport::{AxisHit, Viewport, ViewportConfig, ViewportRange, VisibleCell, VisibleLine};
