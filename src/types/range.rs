use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cell_ref::{format_cell_ref, parse_cell_range};
use crate::error::GridError;

/// An inclusive rectangle of cells: rows `sri..=eri`, columns `sci..=eci`.
///
/// Full-row and full-column spans use `u32::MAX` for the open axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub sri: u32,
    pub sci: u32,
    pub eri: u32,
    pub eci: u32,
}

impl CellRange {
    /// Create a range from its corners (not normalized).
    pub const fn new(sri: u32, sci: u32, eri: u32, eci: u32) -> Self {
        Self { sri, sci, eri, eci }
    }

    /// A single-cell range.
    pub const fn cell(ri: u32, ci: u32) -> Self {
        Self::new(ri, ci, ri, ci)
    }

    /// Rows `start..=end` across every column.
    pub const fn rows(start: u32, end: u32) -> Self {
        Self::new(start, 0, end, u32::MAX)
    }

    /// Columns `start..=end` across every row.
    pub const fn cols(start: u32, end: u32) -> Self {
        Self::new(0, start, u32::MAX, end)
    }

    /// Whether the cell at (ri, ci) lies inside this range.
    pub fn includes(&self, ri: u32, ci: u32) -> bool {
        self.sri <= ri && ri <= self.eri && self.sci <= ci && ci <= self.eci
    }

    /// Whether the two ranges share at least one cell.
    pub fn intersects(&self, other: &Self) -> bool {
        self.sri <= other.eri
            && self.sci <= other.eci
            && other.sri <= self.eri
            && other.sci <= self.eci
    }

    /// Whether the two ranges share no cell.
    pub fn disjoint(&self, other: &Self) -> bool {
        !self.intersects(other)
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains(&self, other: &Self) -> bool {
        self.sri <= other.sri
            && self.sci <= other.sci
            && self.eri >= other.eri
            && self.eci >= other.eci
    }

    /// Whether this range lies entirely inside `other`.
    pub fn within(&self, other: &Self) -> bool {
        other.contains(self)
    }

    /// Bounding box of both ranges.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            sri: self.sri.min(other.sri),
            sci: self.sci.min(other.sci),
            eri: self.eri.max(other.eri),
            eci: self.eci.max(other.eci),
        }
    }

    /// Overlap of both ranges, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self {
            sri: self.sri.max(other.sri),
            sci: self.sci.max(other.sci),
            eri: self.eri.min(other.eri),
            eci: self.eci.min(other.eci),
        })
    }

    /// Number of (rows, cols) covered. Saturates for full-axis spans.
    pub fn size(&self) -> (u32, u32) {
        (
            self.eri.saturating_sub(self.sri).saturating_add(1),
            self.eci.saturating_sub(self.sci).saturating_add(1),
        )
    }

    /// True when the range covers more than one cell.
    pub fn is_multiple(&self) -> bool {
        self.eri > self.sri || self.eci > self.sci
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_cell_ref(self.sri, self.sci))?;
        if self.is_multiple() {
            write!(f, ":{}", format_cell_ref(self.eri, self.eci))?;
        }
        Ok(())
    }
}

impl FromStr for CellRange {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sri, sci, eri, eci) =
            parse_cell_range(s).ok_or_else(|| GridError::CellRef(s.to_string()))?;
        Ok(Self::new(sri, sci, eri, eci))
    }
}
