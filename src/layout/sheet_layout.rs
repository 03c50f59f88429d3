//! Pre-computed layout data for a sheet.
//!
//! This module computes row and column positions once when a sheet is
//! loaded, enabling O(log n) position lookups. It is the stock
//! [`GridMetrics`] adapter for callers holding sparse size maps, and the
//! viewport uses its prefix sums instead of a linear scan.

use std::collections::{HashMap, HashSet};

use super::GridMetrics;

/// Default column width in pixels
pub const DEFAULT_COL_WIDTH: f64 = 64.0;

/// Default row height in pixels
pub const DEFAULT_ROW_HEIGHT: f64 = 20.0;

/// Pre-computed layout data for a sheet
#[derive(Debug, Clone)]
pub struct SheetLayout {
    /// Cumulative row positions (`row_positions[i]` = y of row i's top edge, hidden rows add 0)
    row_positions: Vec<f64>,
    /// Cumulative column positions (`col_positions[i]` = x of column i's left edge)
    col_positions: Vec<f64>,
    /// Row heights as configured (hidden rows keep their size)
    row_heights: Vec<f64>,
    /// Column widths as configured
    col_widths: Vec<f64>,
    hidden_rows: HashSet<u32>,
    hidden_cols: HashSet<u32>,
}

impl SheetLayout {
    /// Create a new layout from sparse sheet data
    ///
    /// # Arguments
    /// * `rows` / `cols` - Number of rows and columns
    /// * `row_heights` / `col_widths` - Sizes that differ from the defaults
    /// * `hidden_rows` / `hidden_cols` - Hidden indices
    pub fn new(
        rows: u32,
        cols: u32,
        row_heights: &HashMap<u32, f64>,
        col_widths: &HashMap<u32, f64>,
        hidden_rows: &HashSet<u32>,
        hidden_cols: &HashSet<u32>,
    ) -> Self {
        let (row_heights, row_positions) =
            build_axis(rows, row_heights, hidden_rows, DEFAULT_ROW_HEIGHT);
        let (col_widths, col_positions) =
            build_axis(cols, col_widths, hidden_cols, DEFAULT_COL_WIDTH);

        Self {
            row_positions,
            col_positions,
            row_heights,
            col_widths,
            hidden_rows: hidden_rows.clone(),
            hidden_cols: hidden_cols.clone(),
        }
    }

    /// Uniform grid where every row and every column share one size.
    pub fn uniform(rows: u32, cols: u32, row_height: f64, col_width: f64) -> Self {
        let row_heights = (0..rows).map(|r| (r, row_height)).collect();
        let col_widths = (0..cols).map(|c| (c, col_width)).collect();
        Self::new(
            rows,
            cols,
            &row_heights,
            &col_widths,
            &HashSet::new(),
            &HashSet::new(),
        )
    }

    /// Y of the top edge of `row` (total height when past the end)
    pub fn row_top(&self, row: u32) -> f64 {
        position_at(&self.row_positions, row)
    }

    /// X of the left edge of `col` (total width when past the end)
    pub fn col_left(&self, col: u32) -> f64 {
        position_at(&self.col_positions, col)
    }

    /// Find the row at y position (binary search); `None` for an empty sheet
    pub fn row_at_y(&self, y: f64) -> Option<u32> {
        index_at(&self.row_positions, y)
    }

    /// Find the column at x position (binary search); `None` for an empty sheet
    pub fn col_at_x(&self, x: f64) -> Option<u32> {
        index_at(&self.col_positions, x)
    }

    /// Get total width of the sheet
    pub fn total_width(&self) -> f64 {
        self.col_positions.last().copied().unwrap_or(0.0)
    }

    /// Get total height of the sheet
    pub fn total_height(&self) -> f64 {
        self.row_positions.last().copied().unwrap_or(0.0)
    }
}

impl GridMetrics for SheetLayout {
    fn row_height(&self, ri: u32) -> f64 {
        self.row_heights
            .get(ri as usize)
            .copied()
            .unwrap_or(DEFAULT_ROW_HEIGHT)
    }

    fn col_width(&self, ci: u32) -> f64 {
        self.col_widths
            .get(ci as usize)
            .copied()
            .unwrap_or(DEFAULT_COL_WIDTH)
    }

    fn total_rows(&self) -> u32 {
        count_of(&self.row_heights)
    }

    fn total_cols(&self) -> u32 {
        count_of(&self.col_widths)
    }

    fn is_row_hidden(&self, ri: u32) -> bool {
        self.hidden_rows.contains(&ri)
    }

    fn is_col_hidden(&self, ci: u32) -> bool {
        self.hidden_cols.contains(&ci)
    }

    fn row_position(&self, ri: u32) -> Option<f64> {
        Some(self.row_top(ri))
    }

    fn col_position(&self, ci: u32) -> Option<f64> {
        Some(self.col_left(ci))
    }

    fn row_at(&self, y: f64) -> Option<u32> {
        self.row_at_y(y)
    }

    fn col_at(&self, x: f64) -> Option<u32> {
        self.col_at_x(x)
    }
}

fn build_axis(
    count: u32,
    sizes: &HashMap<u32, f64>,
    hidden: &HashSet<u32>,
    default: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut lens = Vec::with_capacity(count as usize);
    let mut positions = Vec::with_capacity(count as usize + 1);
    let mut edge = 0.0;
    for i in 0..count {
        positions.push(edge);
        let len = sizes.get(&i).copied().unwrap_or(default);
        lens.push(len);
        if !hidden.contains(&i) {
            edge += len;
        }
    }
    positions.push(edge); // Final edge
    (lens, positions)
}

fn position_at(positions: &[f64], index: u32) -> f64 {
    positions
        .get(index as usize)
        .or_else(|| positions.last())
        .copied()
        .unwrap_or(0.0)
}

fn index_at(positions: &[f64], at: f64) -> Option<u32> {
    // `positions` carries one trailing edge past the last index.
    let count = positions.len().checked_sub(1).filter(|&n| n > 0)?;
    let after = positions.partition_point(|&pos| pos <= at);
    let index = after.saturating_sub(1).min(count - 1);
    u32::try_from(index).ok()
}

fn count_of(lens: &[f64]) -> u32 {
    u32::try_from(lens.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    fn layout_with_hidden(rows: &[u32], cols: &[u32]) -> SheetLayout {
        SheetLayout::new(
            10,
            5,
            &HashMap::new(),
            &HashMap::new(),
            &rows.iter().copied().collect(),
            &cols.iter().copied().collect(),
        )
    }

    #[test]
    fn test_basic_layout() {
        let layout = layout_with_hidden(&[], &[]);

        assert_eq!(layout.total_rows(), 10);
        assert_eq!(layout.total_cols(), 5);
        assert_eq!(layout.total_width(), DEFAULT_COL_WIDTH * 5.0);
        assert_eq!(layout.total_height(), DEFAULT_ROW_HEIGHT * 10.0);
    }

    #[test]
    fn test_custom_sizes() {
        let mut heights = HashMap::new();
        heights.insert(1, 50.0);
        let layout = SheetLayout::new(
            3,
            1,
            &heights,
            &HashMap::new(),
            &HashSet::new(),
            &HashSet::new(),
        );

        assert_eq!(layout.row_height(1), 50.0);
        assert_eq!(layout.row_top(2), DEFAULT_ROW_HEIGHT + 50.0);
        assert_eq!(layout.total_height(), DEFAULT_ROW_HEIGHT * 2.0 + 50.0);
    }

    #[test]
    fn test_hidden_rows_take_no_space() {
        let layout = layout_with_hidden(&[1, 2], &[0]);

        assert!(layout.is_row_hidden(1));
        assert!(layout.is_col_hidden(0));
        assert_eq!(layout.row_height(1), DEFAULT_ROW_HEIGHT);
        assert_eq!(layout.row_top(3), DEFAULT_ROW_HEIGHT);
        assert_eq!(layout.total_height(), DEFAULT_ROW_HEIGHT * 8.0);
        assert_eq!(layout.total_width(), DEFAULT_COL_WIDTH * 4.0);
    }

    #[test]
    fn test_row_at_y() {
        let layout = layout_with_hidden(&[], &[]);

        assert_eq!(layout.row_at_y(0.0), Some(0));
        assert_eq!(layout.row_at_y(10.0), Some(0));
        assert_eq!(layout.row_at_y(DEFAULT_ROW_HEIGHT), Some(1));
        assert_eq!(layout.row_at_y(DEFAULT_ROW_HEIGHT * 2.5), Some(2));
        assert_eq!(layout.row_at_y(1.0e9), Some(9));
    }

    #[test]
    fn test_row_at_y_skips_hidden() {
        let layout = layout_with_hidden(&[1, 2], &[]);

        // Row 1 and 2 collapse onto row 3's top edge.
        assert_eq!(layout.row_at_y(DEFAULT_ROW_HEIGHT), Some(3));
    }

    #[test]
    fn test_col_at_x() {
        let layout = layout_with_hidden(&[], &[]);

        assert_eq!(layout.col_at_x(0.0), Some(0));
        assert_eq!(layout.col_at_x(32.0), Some(0));
        assert_eq!(layout.col_at_x(DEFAULT_COL_WIDTH), Some(1));
        assert_eq!(layout.col_at_x(DEFAULT_COL_WIDTH * 2.5), Some(2));
    }

    #[test]
    fn test_empty_sheet() {
        let layout = SheetLayout::uniform(0, 0, 20.0, 64.0);

        assert_eq!(layout.row_at_y(0.0), None);
        assert_eq!(layout.col_at_x(0.0), None);
        assert_eq!(layout.total_height(), 0.0);
        assert_eq!(layout.row_top(4), 0.0);
    }
}
