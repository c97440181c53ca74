//! WASM bindings for in-browser rewriting and scale calculation.
//!
//! Event wiring stays on the JavaScript side; these are the pure pieces.

use wasm_bindgen::prelude::*;

use crate::config::RewriteConfig;
use crate::flexible::{self, BreakpointTable};
use crate::rewrite::{LengthUnit, Rewriter};
use crate::util::format_number;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Rewrite `px` literals in a style sheet.
///
/// `options` is a JSON object in the `px` config section format; pass
/// `"{}"` for defaults. `source` is the sheet's path, used by `exclude`.
#[wasm_bindgen(js_name = pxToLocalVar)]
pub fn px_to_local_var(css: &str, options: &str, source: Option<String>) -> Result<String, JsValue> {
    rewrite_with(LengthUnit::Px, css, options, source.as_deref())
}

/// Rewrite `rem` literals in a style sheet.
#[wasm_bindgen(js_name = remToLocalVar)]
pub fn rem_to_local_var(css: &str, options: &str, source: Option<String>) -> Result<String, JsValue> {
    rewrite_with(LengthUnit::Rem, css, options, source.as_deref())
}

/// Scale factor for a viewport width.
#[wasm_bindgen(js_name = computeScale)]
pub fn compute_scale(
    viewport_width: f64,
    breakpoints: Vec<f64>,
    layouts: Vec<f64>,
    basic_layout: Option<f64>,
) -> f64 {
    let basic = basic_layout.or_else(|| layouts.last().copied()).unwrap_or(1.0);
    flexible::compute_scale(viewport_width, &breakpoints, &layouts, basic)
}

/// The value to assign to the scoped variable, e.g. `"19.2px"`.
///
/// Fails if the breakpoints are not strictly ascending.
#[wasm_bindgen(js_name = unitValue)]
pub fn unit_value(
    viewport_width: f64,
    breakpoints: Vec<f64>,
    layouts: Option<Vec<f64>>,
    basic_layout: Option<f64>,
) -> Result<String, JsValue> {
    let table = BreakpointTable::new(breakpoints, layouts, basic_layout)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let value = flexible::unit_value(viewport_width, table.scale(viewport_width));
    Ok(format!("{}px", format_number(value)))
}

fn rewrite_with(
    unit: LengthUnit,
    css: &str,
    options: &str,
    source: Option<&str>,
) -> Result<String, JsValue> {
    let config: RewriteConfig =
        serde_json::from_str(options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let rewriter =
        Rewriter::new(config.into_options(unit)).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(rewriter.process(css, source))
}
