//! Viewport range computation tests
//!
//! Visible range with buffers, frozen panes, hidden lines, caching and
//! position lookups.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::collections::{HashMap, HashSet};

use gridframe::layout::{FnMetrics, SheetLayout, Viewport, ViewportConfig};
use test_case::test_case;

use common::{scenario_metrics, uniform};

fn scenario_viewport() -> Viewport<FnMetrics> {
    let mut viewport = Viewport::new(ViewportConfig::default(), scenario_metrics());
    viewport.set_view_size(800.0, 600.0);
    viewport
}

// ============================================================================
// Range
// ============================================================================

#[test]
fn test_reference_scenario_range() {
    let mut viewport = scenario_viewport();
    let range = viewport.range();

    assert_eq!(range.sri, 0);
    assert_eq!(range.sci, 0);
    assert!(range.eri >= 23 && range.eri <= 999);
    assert!(range.eci >= 7 && range.eci <= 25);
    // 25 rows cover 600px, plus 5 rows of buffer.
    assert_eq!(range.eri, 29);
    // 9 columns cover 800px, plus 3 columns of buffer.
    assert_eq!(range.eci, 11);
    assert_eq!(range.height, 30.0 * 25.0);
    assert_eq!(range.width, 12.0 * 100.0);
}

#[test]
fn test_scrolled_range_includes_buffer_before() {
    let mut viewport = scenario_viewport();
    viewport.set_scroll(0.0, 2500.0); // row 100 at the top

    let range = viewport.range();
    assert_eq!(range.sri, 95);
    assert!(range.eri >= 100 + 23);
}

#[test]
fn test_range_end_capped_at_last_row() {
    let mut viewport = scenario_viewport();
    viewport.set_scroll(0.0, 1_000_000.0);

    let range = viewport.range();
    assert_eq!(range.eri, 999);
    assert!(range.sri <= range.eri);
}

#[test_case(0, 0 ; "no freeze")]
#[test_case(3, 2 ; "small freeze")]
#[test_case(40, 10 ; "freeze beyond buffer")]
fn test_range_never_starts_inside_freeze(freeze_rows: u32, freeze_cols: u32) {
    let mut viewport = scenario_viewport();
    viewport.set_freeze(freeze_rows, freeze_cols);
    for scroll in [0.0, 10.0, 125.0, 5000.0] {
        viewport.set_scroll(scroll, scroll);
        let range = viewport.range();
        assert!(range.sri >= freeze_rows);
        assert!(range.sci >= freeze_cols);
        assert!(range.sri <= range.eri);
        assert!(range.sci <= range.eci);
    }
}

#[test]
fn test_scroll_measured_from_freeze_boundary() {
    let mut viewport = Viewport::new(
        ViewportConfig {
            row_buffer: 0,
            col_buffer: 0,
        },
        scenario_metrics(),
    );
    viewport.set_view_size(800.0, 100.0);
    viewport.set_freeze(2, 0);

    let range = viewport.range();
    assert_eq!(range.sri, 2);

    viewport.set_scroll(0.0, 50.0);
    assert_eq!(viewport.range().sri, 4);
}

#[test]
fn test_hidden_rows_are_skipped_by_iteration() {
    let metrics = uniform(100, 5, 10.0, 50.0).with_hidden_rows(|ri| ri % 2 == 1);
    let mut viewport = Viewport::new(ViewportConfig::default(), metrics);
    viewport.set_view_size(250.0, 100.0);

    let mut rows = Vec::new();
    viewport.each_visible_row(|line| rows.push(line.index));
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|ri| ri % 2 == 0));

    // Offsets accumulate only over shown rows.
    let mut offsets = Vec::new();
    viewport.each_visible_row(|line| offsets.push(line.offset));
    assert_eq!(offsets[1], 10.0);
}

#[test_case(0, 0 ; "empty grid")]
#[test_case(5, 0 ; "no columns")]
#[test_case(0, 5 ; "no rows")]
fn test_degenerate_grid_collapses(rows: u32, cols: u32) {
    let mut viewport = Viewport::new(ViewportConfig::default(), uniform(rows, cols, 20.0, 60.0));
    viewport.set_view_size(800.0, 600.0);
    let range = viewport.range();
    if rows == 0 {
        assert_eq!((range.sri, range.eri), (0, 0));
        assert_eq!(range.height, 0.0);
    }
    if cols == 0 {
        assert_eq!((range.sci, range.eci), (0, 0));
        assert_eq!(range.width, 0.0);
    }

    let mut cells = 0;
    viewport.each_visible_cell(|_| cells += 1);
    assert_eq!(cells, 0);
}

#[test]
fn test_freeze_covering_whole_axis() {
    let mut viewport = Viewport::new(ViewportConfig::default(), uniform(10, 10, 20.0, 60.0));
    viewport.set_view_size(800.0, 600.0);
    viewport.set_freeze(10, 4);

    let range = viewport.range();
    assert_eq!((range.sri, range.eri), (10, 10));
    assert!(range.sci >= 4);
    assert!(range.eci <= 9);
}

#[test]
fn test_sheet_layout_metrics_drive_viewport() {
    let mut heights = HashMap::new();
    heights.insert(0, 200.0);
    let layout = SheetLayout::new(
        50,
        10,
        &heights,
        &HashMap::new(),
        &HashSet::new(),
        &HashSet::new(),
    );
    let mut viewport = Viewport::new(
        ViewportConfig {
            row_buffer: 0,
            col_buffer: 0,
        },
        layout,
    );
    viewport.set_view_size(640.0, 100.0);

    let range = viewport.range();
    assert_eq!((range.sri, range.eri), (0, 0));

    viewport.set_scroll(0.0, 210.0);
    assert_eq!(viewport.range().sri, 1);
}

// ============================================================================
// Caching
// ============================================================================

#[test]
fn test_unchanged_inputs_reuse_cached_range() {
    let mut viewport = scenario_viewport();
    let first = viewport.range();
    let revision = viewport.revision();

    viewport.set_scroll(0.0, 0.0);
    viewport.set_view_size(800.0, 600.0);
    viewport.set_freeze(0, 0);

    assert_eq!(viewport.range(), first);
    assert_eq!(viewport.revision(), revision);
}

#[test_case(-0.0, 0.0 ; "negative zero scroll")]
#[test_case(0.0, -0.0 ; "negative zero scroll y")]
fn test_signed_zero_is_not_a_change(x: f64, y: f64) {
    let mut viewport = scenario_viewport();
    let first = viewport.range();
    let revision = viewport.revision();

    viewport.set_scroll(x, y);
    viewport.set_view_size(800.0, 600.0);
    assert_eq!(viewport.range(), first);
    assert_eq!(viewport.revision(), revision);
}

#[derive(Debug, Clone, Copy)]
enum Input {
    Scroll,
    ViewSize,
    Freeze,
}

#[test_case(Input::Scroll ; "scroll")]
#[test_case(Input::ViewSize ; "view size")]
#[test_case(Input::Freeze ; "freeze")]
fn test_changed_input_recomputes(input: Input) {
    let mut viewport = scenario_viewport();
    let before = viewport.range();
    let revision = viewport.revision();

    match input {
        Input::Scroll => viewport.set_scroll(0.0, 25.0),
        Input::ViewSize => viewport.set_view_size(800.0, 300.0),
        Input::Freeze => viewport.set_freeze(3, 2),
    }
    let after = viewport.range();
    assert_eq!(viewport.revision(), revision + 1);
    assert_ne!(after, before);
    match input {
        Input::Scroll => assert_eq!(after.eri, 30),
        Input::ViewSize => assert!(after.eri < before.eri),
        Input::Freeze => assert_eq!((after.sri, after.sci), (3, 2)),
    }
}

#[test]
fn test_invalidate_forces_recompute() {
    let mut viewport = scenario_viewport();
    viewport.range();
    let revision = viewport.revision();

    viewport.invalidate();
    viewport.range();
    assert_eq!(viewport.revision(), revision + 1);
}

#[test]
fn test_metrics_mut_invalidates() {
    let mut viewport = Viewport::new(
        ViewportConfig::default(),
        SheetLayout::uniform(100, 10, 25.0, 100.0),
    );
    viewport.set_view_size(800.0, 600.0);
    assert_eq!(viewport.range().eri, 29);

    *viewport.metrics_mut() = SheetLayout::uniform(10, 10, 25.0, 100.0);
    assert_eq!(viewport.range().eri, 9);
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_visibility_queries() {
    let mut viewport = scenario_viewport();
    assert!(viewport.is_visible(0, 0));
    assert!(viewport.is_visible(29, 11));
    assert!(!viewport.is_visible(30, 0));
    assert!(!viewport.is_col_visible(12));
    assert!(viewport.is_row_visible(10));
}

#[test_case(0.0, 0, 0.0 ; "top edge")]
#[test_case(24.9, 0, 0.0 ; "inside first row")]
#[test_case(25.0, 1, 25.0 ; "exact boundary")]
#[test_case(260.0, 10, 250.0 ; "deep row")]
fn test_find_row_at_y(y: f64, index: u32, offset: f64) {
    let viewport = scenario_viewport();
    let hit = viewport.find_row_at_y(y);
    assert_eq!(hit.index, index);
    assert_eq!(hit.offset, offset);
}

#[test]
fn test_find_past_end_returns_last_index() {
    let viewport = Viewport::new(ViewportConfig::default(), uniform(4, 3, 10.0, 10.0));
    let hit = viewport.find_row_at_y(1000.0);
    assert_eq!(hit.index, 3);
    assert_eq!(hit.offset, 40.0);

    let hit = viewport.find_col_at_x(1000.0);
    assert_eq!(hit.index, 2);
}

#[test_case(0 ; "no freeze")]
#[test_case(2 ; "frozen rows")]
fn test_indexed_lookup_matches_scan(freeze: u32) {
    let sizes: HashMap<u32, f64> = (0..40).map(|i| (i, 10.0 + f64::from(i % 3) * 5.0)).collect();
    let hidden: HashSet<u32> = [3, 4, 10, 39].into_iter().collect();
    let layout = SheetLayout::new(40, 1, &sizes, &HashMap::new(), &hidden, &HashSet::new());
    let scan = {
        let (sizes, hidden) = (sizes.clone(), hidden.clone());
        FnMetrics::new(move |ri| sizes[&ri], |_| 64.0, || 40, || 1)
            .with_hidden_rows(move |ri| hidden.contains(&ri))
    };

    let mut indexed = Viewport::new(ViewportConfig::default(), layout);
    let mut linear = Viewport::new(ViewportConfig::default(), scan);
    indexed.set_freeze(freeze, 0);
    linear.set_freeze(freeze, 0);

    let mut y = -5.0;
    while y < 700.0 {
        assert_eq!(indexed.find_row_at_y(y), linear.find_row_at_y(y), "y = {y}");
        y += 2.5;
    }
}

#[test]
fn test_each_visible_cell_row_major_with_offsets() {
    let mut viewport = Viewport::new(
        ViewportConfig {
            row_buffer: 0,
            col_buffer: 0,
        },
        uniform(10, 10, 10.0, 20.0),
    );
    viewport.set_view_size(30.0, 15.0);

    let mut cells = Vec::new();
    viewport.each_visible_cell(|cell| cells.push((cell.ri, cell.ci, cell.x, cell.y)));

    // Rows 0..=1 (15px straddles row 1), columns 0..=1 (30px straddles col 1).
    assert_eq!(
        cells,
        vec![
            (0, 0, 0.0, 0.0),
            (0, 1, 20.0, 0.0),
            (1, 0, 0.0, 10.0),
            (1, 1, 20.0, 10.0),
        ]
    );
}

#[test]
fn test_config_deserializes_with_defaults() {
    let config: ViewportConfig = serde_json::from_str(r#"{"rowBuffer": 2}"#).unwrap();
    assert_eq!(config.row_buffer, 2);
    assert_eq!(config.col_buffer, 3);
}
