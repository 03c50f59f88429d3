//! Structured error types for gridframe.
//!
//! The render pipeline itself never fails; errors only surface at the edges
//! (reference parsing and the host frame/binding layer).

/// All errors that can occur at the gridframe boundaries.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// The host refused or could not service a frame request.
    #[error("Frame request failed: {0}")]
    FrameRequest(String),

    /// Invalid cell reference or range text.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// A JavaScript callback raised or returned an unusable value.
    #[error("JavaScript callback: {0}")]
    Js(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
