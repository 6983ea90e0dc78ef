//! Band scale padding for histograms with very few bins
//!
//! With two to four bins Vega-Lite's default band padding renders bars that
//! are either too wide or spaced oddly. The outer padding is therefore an
//! expression over the live row count of the rendered dataset.

use crate::SourceName;
use serde_json::{json, Value};

/// `(category count, outer padding)` pairs; any other count pads with [`DEFAULT_PADDING`]
const PADDING_RULES: &[(usize, f64)] = &[(2, 1.0), (3, 0.5), (4, 0.0)];

const DEFAULT_PADDING: f64 = 0.0;

/// Outer padding for a given number of rendered categories
pub fn padding_outer(category_count: usize) -> f64 {
    PADDING_RULES
        .iter()
        .find(|(count, _)| *count == category_count)
        .map(|(_, padding)| *padding)
        .unwrap_or(DEFAULT_PADDING)
}

/// Vega expression computing [`padding_outer`] from the row count of `source`
///
/// `length(data('source_0')) == 2 ? 1 : length(data('source_0')) == 3 ? 0.5 : ... : 0`
pub fn padding_expression(source: SourceName) -> String {
    let length = format!("length(data('{}'))", source.as_str());
    let mut parts: Vec<String> = PADDING_RULES
        .iter()
        .map(|(count, padding)| format!("{} == {} ? {}", length, count, padding))
        .collect();
    parts.push(DEFAULT_PADDING.to_string());
    parts.join(" : ")
}

/// Band scale used on the temporal histogram x axis
pub fn band_scale(source: SourceName) -> Value {
    json!({
        "align": 0,
        "paddingInner": 0,
        "paddingOuter": {
            "expr": padding_expression(source),
        },
    })
}
