//! Browser binding: a [`GridView`] whose geometry and painting are JS
//! callbacks and whose frames come from `requestAnimationFrame`.
//!
//! ```javascript
//! const view = new JsGridView(rowHeight, colWidth, 1000, 26, paint, { settleDelayMs: 100 });
//! view.setViewSize(canvas.width, canvas.height);
//! view.setScroll(x, y);          // from the scroll handler
//! setInterval(() => view.pollSettle(), 50);
//! ```

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_time::Instant;

use super::{GridPainter, GridSource, GridView, GridViewConfig, RenderPass, RepaintMode};
use crate::error::GridError;
use crate::layout::{GridMetrics, ViewportRange};
use crate::render::SharedScheduler;
use crate::types::CellRange;

/// Geometry backed by JS functions plus the view inputs set from JS.
#[derive(Clone)]
struct JsSource {
    row_height: Function,
    col_width: Function,
    hidden_rows: Option<Function>,
    hidden_cols: Option<Function>,
    total_rows: u32,
    total_cols: u32,
    scroll: (f64, f64),
    view_size: (f64, f64),
    freeze: (u32, u32),
}

fn call_size(f: &Function, index: u32) -> f64 {
    match f.call1(&JsValue::NULL, &JsValue::from(index)) {
        Ok(value) => value
            .as_f64()
            .filter(|size| size.is_finite() && *size >= 0.0)
            .unwrap_or(0.0),
        Err(e) => {
            tracing::warn!(
                target: "gridframe.wasm",
                error = %GridError::Js(format!("{e:?}")),
                index,
                "size_callback_failed"
            );
            0.0
        }
    }
}

fn call_flag(f: Option<&Function>, index: u32) -> bool {
    f.and_then(|f| f.call1(&JsValue::NULL, &JsValue::from(index)).ok())
        .is_some_and(|value| value.is_truthy())
}

impl GridMetrics for JsSource {
    fn row_height(&self, ri: u32) -> f64 {
        call_size(&self.row_height, ri)
    }

    fn col_width(&self, ci: u32) -> f64 {
        call_size(&self.col_width, ci)
    }

    fn total_rows(&self) -> u32 {
        self.total_rows
    }

    fn total_cols(&self) -> u32 {
        self.total_cols
    }

    fn is_row_hidden(&self, ri: u32) -> bool {
        call_flag(self.hidden_rows.as_ref(), ri)
    }

    fn is_col_hidden(&self, ci: u32) -> bool {
        call_flag(self.hidden_cols.as_ref(), ci)
    }
}

impl GridSource for JsSource {
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

/// Plain-object form of a [`RenderPass`] handed to the JS painter.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PassPayload {
    mode: &'static str,
    partial: Option<CellRange>,
    range: ViewportRange,
    selection_dirty: bool,
    headers_dirty: bool,
    grid_dirty: bool,
}

impl From<&RenderPass> for PassPayload {
    fn from(pass: &RenderPass) -> Self {
        let (mode, partial) = match pass.mode {
            RepaintMode::Full => ("full", None),
            RepaintMode::Partial(range) => ("partial", Some(range)),
            RepaintMode::Overlays => ("overlays", None),
        };
        Self {
            mode,
            partial,
            range: pass.range,
            selection_dirty: pass.dirty.selection_dirty,
            headers_dirty: pass.dirty.headers_dirty,
            grid_dirty: pass.dirty.grid_dirty,
        }
    }
}

struct JsPainter {
    paint: Function,
}

impl GridPainter for JsPainter {
    fn paint(&mut self, pass: &RenderPass) {
        let result = serde_wasm_bindgen::to_value(&PassPayload::from(pass))
            .map_err(|e| GridError::Js(e.to_string()))
            .and_then(|payload| {
                self.paint
                    .call1(&JsValue::NULL, &payload)
                    .map_err(|e| GridError::Js(format!("{e:?}")))
            });
        if let Err(err) = result {
            tracing::warn!(target: "gridframe.wasm", error = %err, "paint_failed");
        }
    }
}

/// Grid render coordinator for the browser.
#[wasm_bindgen]
pub struct JsGridView {
    view: GridView<JsSource, JsPainter>,
}

#[wasm_bindgen]
impl JsGridView {
    /// Create a view. `config` may be `undefined` or a partial
    /// `{ viewport: { rowBuffer, colBuffer }, settleDelayMs }` object.
    #[wasm_bindgen(constructor)]
    pub fn new(
        row_height: Function,
        col_width: Function,
        total_rows: u32,
        total_cols: u32,
        paint: Function,
        config: JsValue,
    ) -> Result<JsGridView, JsValue> {
        console_error_panic_hook::set_once();

        let config: GridViewConfig = if config.is_undefined() || config.is_null() {
            GridViewConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| GridError::Js(format!("invalid config: {e}")))?
        };

        let source = JsSource {
            row_height,
            col_width,
            hidden_rows: None,
            hidden_cols: None,
            total_rows,
            total_cols,
            scroll: (0.0, 0.0),
            view_size: (0.0, 0.0),
            freeze: (0, 0),
        };
        let view = GridView::with_scheduler(
            source,
            JsPainter { paint },
            config,
            SharedScheduler::with_animation_frames(),
        );
        view.render();
        Ok(Self { view })
    }

    #[wasm_bindgen(js_name = setScroll)]
    pub fn set_scroll(&mut self, x: f64, y: f64) {
        self.view.with_source_mut(|s| s.scroll = (x, y));
        self.view.mark_scroll_dirty(Instant::now());
    }

    #[wasm_bindgen(js_name = setViewSize)]
    pub fn set_view_size(&mut self, width: f64, height: f64) {
        self.view.with_source_mut(|s| s.view_size = (width, height));
        self.view.render();
    }

    #[wasm_bindgen(js_name = setFreeze)]
    pub fn set_freeze(&mut self, rows: u32, cols: u32) {
        self.view.with_source_mut(|s| s.freeze = (rows, cols));
        self.view.render();
    }

    /// Install (or clear, with `undefined`) the hidden-row predicate.
    #[wasm_bindgen(js_name = setHiddenRows)]
    pub fn set_hidden_rows(&mut self, hidden: Option<Function>) {
        self.reset_with(|s| s.hidden_rows = hidden);
    }

    #[wasm_bindgen(js_name = setHiddenCols)]
    pub fn set_hidden_cols(&mut self, hidden: Option<Function>) {
        self.reset_with(|s| s.hidden_cols = hidden);
    }

    /// New data dimensions; everything is repainted.
    #[wasm_bindgen(js_name = resetData)]
    pub fn reset_data(&mut self, total_rows: u32, total_cols: u32) {
        self.reset_with(|s| {
            s.total_rows = total_rows;
            s.total_cols = total_cols;
        });
    }

    pub fn render(&self) {
        self.view.render();
    }

    #[wasm_bindgen(js_name = renderNow)]
    pub fn render_now(&self) {
        self.view.render_now();
    }

    #[wasm_bindgen(js_name = markCellsDirty)]
    pub fn mark_cells_dirty(&self, sri: u32, sci: u32, eri: u32, eci: u32) {
        self.view.mark_cells_dirty(CellRange::new(sri, sci, eri, eci));
    }

    /// Mark an A1-style range (`"B2"`, `"A1:C3"`) dirty.
    #[wasm_bindgen(js_name = markRefDirty)]
    pub fn mark_ref_dirty(&self, reference: &str) -> Result<(), JsValue> {
        let range: CellRange = reference.parse()?;
        self.view.mark_cells_dirty(range);
        Ok(())
    }

    #[wasm_bindgen(js_name = markSelectionDirty)]
    pub fn mark_selection_dirty(&self) {
        self.view.mark_selection_dirty();
    }

    /// Call periodically; returns `true` when the scroll settle pass was
    /// scheduled.
    #[wasm_bindgen(js_name = pollSettle)]
    pub fn poll_settle(&mut self) -> bool {
        self.view.poll_settle(Instant::now())
    }

    #[wasm_bindgen(js_name = isPending)]
    pub fn is_pending(&self) -> bool {
        self.view.is_pending()
    }

    pub fn fps(&self) -> u32 {
        self.view.fps()
    }

    /// Current realized range as `{ sri, sci, eri, eci, width, height }`.
    #[wasm_bindgen(js_name = viewportRange)]
    pub fn viewport_range(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.view.viewport_range())
            .map_err(|e| GridError::Js(e.to_string()).into())
    }

    pub fn destroy(&mut self) {
        self.view.destroy();
    }
}

impl JsGridView {
    fn reset_with(&mut self, f: impl FnOnce(&mut JsSource)) {
        let mut source = self.view.with_source(JsSource::clone);
        f(&mut source);
        self.view.reset_data(source);
    }
}
