//! Geometry capability consumed by the viewport.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Row/column geometry of a grid, as supplied by the data model.
///
/// All methods must be pure and deterministic for a given data snapshot.
/// Sizes are in pixels; negative or NaN sizes are outside the contract.
pub trait GridMetrics {
    /// Height of row `ri` in pixels.
    fn row_height(&self, ri: u32) -> f64;
    /// Width of column `ci` in pixels.
    fn col_width(&self, ci: u32) -> f64;
    /// Number of rows in the grid.
    fn total_rows(&self) -> u32;
    /// Number of columns in the grid.
    fn total_cols(&self) -> u32;

    fn is_row_hidden(&self, _ri: u32) -> bool {
        false
    }

    fn is_col_hidden(&self, _ci: u32) -> bool {
        false
    }

    /// Top edge of row `ri` measured from row 0, hidden rows taking no
    /// space; `ri == total_rows()` gives the full height.
    ///
    /// Metrics that keep prefix sums answer this and [`row_at`](Self::row_at)
    /// so the viewport binary-searches instead of scanning from the freeze
    /// boundary. Both default to `None`.
    fn row_position(&self, _ri: u32) -> Option<f64> {
        None
    }

    /// Left edge of column `ci`, the column counterpart of
    /// [`row_position`](Self::row_position).
    fn col_position(&self, _ci: u32) -> Option<f64> {
        None
    }

    /// Last row whose top edge is at or above `y`.
    fn row_at(&self, _y: f64) -> Option<u32> {
        None
    }

    /// Last column whose left edge is at or left of `x`.
    fn col_at(&self, _x: f64) -> Option<u32> {
        None
    }
}

impl<T: GridMetrics + ?Sized> GridMetrics for &T {
    fn row_height(&self, ri: u32) -> f64 {
        (**self).row_height(ri)
    }
    fn col_width(&self, ci: u32) -> f64 {
        (**self).col_width(ci)
    }
    fn total_rows(&self) -> u32 {
        (**self).total_rows()
    }
    fn total_cols(&self) -> u32 {
        (**self).total_cols()
    }
    fn is_row_hidden(&self, ri: u32) -> bool {
        (**self).is_row_hidden(ri)
    }
    fn is_col_hidden(&self, ci: u32) -> bool {
        (**self).is_col_hidden(ci)
    }
    fn row_position(&self, ri: u32) -> Option<f64> {
        (**self).row_position(ri)
    }
    fn col_position(&self, ci: u32) -> Option<f64> {
        (**self).col_position(ci)
    }
    fn row_at(&self, y: f64) -> Option<u32> {
        (**self).row_at(y)
    }
    fn col_at(&self, x: f64) -> Option<u32> {
        (**self).col_at(x)
    }
}

macro_rules! forward_smart_pointer {
    ($($ptr:ident),*) => {$(
        impl<T: GridMetrics + ?Sized> GridMetrics for $ptr<T> {
            fn row_height(&self, ri: u32) -> f64 {
                (**self).row_height(ri)
            }
            fn col_width(&self, ci: u32) -> f64 {
                (**self).col_width(ci)
            }
            fn total_rows(&self) -> u32 {
                (**self).total_rows()
            }
            fn total_cols(&self) -> u32 {
                (**self).total_cols()
            }
            fn is_row_hidden(&self, ri: u32) -> bool {
                (**self).is_row_hidden(ri)
            }
            fn is_col_hidden(&self, ci: u32) -> bool {
                (**self).is_col_hidden(ci)
            }
            fn row_position(&self, ri: u32) -> Option<f64> {
                (**self).row_position(ri)
            }
            fn col_position(&self, ci: u32) -> Option<f64> {
                (**self).col_position(ci)
            }
            fn row_at(&self, y: f64) -> Option<u32> {
                (**self).row_at(y)
            }
            fn col_at(&self, x: f64) -> Option<u32> {
                (**self).col_at(x)
            }
        }
    )*};
}

forward_smart_pointer!(Box, Rc, Arc);

type SizeFn = Box<dyn Fn(u32) -> f64>;
type CountFn = Box<dyn Fn() -> u32>;
type HiddenFn = Box<dyn Fn(u32) -> bool>;

/// [`GridMetrics`] assembled from plain closures.
///
/// The hidden-row and hidden-column accessors are optional; when omitted
/// nothing is hidden.
///
/// ```
/// use gridframe::layout::{FnMetrics, GridMetrics};
///
/// let metrics = FnMetrics::new(|_| 25.0, |_| 100.0, || 1000, || 26)
///     .with_hidden_rows(|ri| ri == 3);
/// assert!(metrics.is_row_hidden(3));
/// assert!(!metrics.is_col_hidden(3));
/// ```
pub struct FnMetrics {
    row_height: SizeFn,
    col_width: SizeFn,
    total_rows: CountFn,
    total_cols: CountFn,
    row_hidden: Option<HiddenFn>,
    col_hidden: Option<HiddenFn>,
}

impl FnMetrics {
    pub fn new(
        row_height: impl Fn(u32) -> f64 + 'static,
        col_width: impl Fn(u32) -> f64 + 'static,
        total_rows: impl Fn() -> u32 + 'static,
        total_cols: impl Fn() -> u32 + 'static,
    ) -> Self {
        Self {
            row_height: Box::new(row_height),
            col_width: Box::new(col_width),
            total_rows: Box::new(total_rows),
            total_cols: Box::new(total_cols),
            row_hidden: None,
            col_hidden: None,
        }
    }

    #[must_use]
    pub fn with_hidden_rows(mut self, hidden: impl Fn(u32) -> bool + 'static) -> Self {
        self.row_hidden = Some(Box::new(hidden));
        self
    }

    #[must_use]
    pub fn with_hidden_cols(mut self, hidden: impl Fn(u32) -> bool + 'static) -> Self {
        self.col_hidden = Some(Box::new(hidden));
        self
    }
}

impl GridMetrics for FnMetrics {
    fn row_height(&self, ri: u32) -> f64 {
        (self.row_height)(ri)
    }

    fn col_width(&self, ci: u32) -> f64 {
        (self.col_width)(ci)
    }

    fn total_rows(&self) -> u32 {
        (self.total_rows)()
    }

    fn total_cols(&self) -> u32 {
        (self.total_cols)()
    }

    fn is_row_hidden(&self, ri: u32) -> bool {
        self.row_hidden.as_ref().is_some_and(|hidden| hidden(ri))
    }

    fn is_col_hidden(&self, ci: u32) -> bool {
        self.col_hidden.as_ref().is_some_and(|hidden| hidden(ci))
    }
}

impl fmt::Debug for FnMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMetrics")
            .field("total_rows", &self.total_rows())
            .field("total_cols", &self.total_cols())
            .field("row_hidden", &self.row_hidden.is_some())
            .field("col_hidden", &self.col_hidden.is_some())
            .finish()
    }
}
