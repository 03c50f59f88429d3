//! Shared fixtures for the integration tests.
//!
//! - `uniform`: closure-backed metrics with fixed sizes
//! - `TestSource`: a `GridSource` over a `SheetLayout` with settable view inputs
//! - `RecordingPainter`: keeps every pass it receives
//! - `host_scheduler`: a scheduler pumped by the test through a `FrameSignal`
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use gridframe::layout::{FnMetrics, GridMetrics, SheetLayout};
use gridframe::render::{FrameSignal, HostFrames, RenderScheduler, SharedScheduler};
use gridframe::viewer::{GridPainter, GridSource, RenderPass};

/// Every row `row_height` tall, every column `col_width` wide.
pub fn uniform(rows: u32, cols: u32, row_height: f64, col_width: f64) -> FnMetrics {
    FnMetrics::new(
        move |_| row_height,
        move |_| col_width,
        move || rows,
        move || cols,
    )
}

/// Metrics of the reference scenario: 1000 x 26 cells of 25 x 100 px.
pub fn scenario_metrics() -> FnMetrics {
    uniform(1000, 26, 25.0, 100.0)
}

#[derive(Debug, Clone)]
pub struct TestSource {
    pub layout: SheetLayout,
    pub scroll: (f64, f64),
    pub view_size: (f64, f64),
    pub freeze: (u32, u32),
}

impl TestSource {
    pub fn uniform(rows: u32, cols: u32) -> Self {
        Self {
            layout: SheetLayout::uniform(rows, cols, 25.0, 100.0),
            scroll: (0.0, 0.0),
            view_size: (800.0, 600.0),
            freeze: (0, 0),
        }
    }
}

impl GridMetrics for TestSource {
    fn row_height(&self, ri: u32) -> f64 {
        self.layout.row_height(ri)
    }
    fn col_width(&self, ci: u32) -> f64 {
        self.layout.col_width(ci)
    }
    fn total_rows(&self) -> u32 {
        self.layout.total_rows()
    }
    fn total_cols(&self) -> u32 {
        self.layout.total_cols()
    }
    fn is_row_hidden(&self, ri: u32) -> bool {
        self.layout.is_row_hidden(ri)
    }
    fn is_col_hidden(&self, ci: u32) -> bool {
        self.layout.is_col_hidden(ci)
    }
    fn row_position(&self, ri: u32) -> Option<f64> {
        self.layout.row_position(ri)
    }
    fn col_position(&self, ci: u32) -> Option<f64> {
        self.layout.col_position(ci)
    }
    fn row_at(&self, y: f64) -> Option<u32> {
        self.layout.row_at(y)
    }
    fn col_at(&self, x: f64) -> Option<u32> {
        self.layout.col_at(x)
    }
}

impl GridSource for TestSource {
    fn scroll(&self) -> (f64, f64) {
        self.scroll
    }
    fn view_size(&self) -> (f64, f64) {
        self.view_size
    }
    fn freeze(&self) -> (u32, u32) {
        self.freeze
    }
}

#[derive(Debug, Default)]
pub struct RecordingPainter {
    pub passes: Vec<RenderPass>,
}

impl GridPainter for RecordingPainter {
    fn paint(&mut self, pass: &RenderPass) {
        self.passes.push(pass.clone());
    }
}

/// Scheduler whose frames the test fires by hand after checking `signal`.
pub fn host_scheduler() -> (SharedScheduler, FrameSignal) {
    let signal = FrameSignal::new();
    let scheduler =
        SharedScheduler::new(RenderScheduler::with_requester(HostFrames::new(signal.clone())));
    (scheduler, signal)
}
