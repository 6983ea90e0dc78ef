//! Centralized naming conventions for identifiers that appear inside generated specs.
//!
//! Vega-Lite derives field names for its own transforms (binning, aggregation)
//! and names the datasets it compiles. Expressions we embed in a spec have to
//! reference those derived names exactly, so they are built here in one place.
//!
//! # Categories
//!
//! - **Dataset names**: `data_0` (inline values) and `source_0` (URL / row data)
//! - **Bin fields**: `bin_maxbins_10_<field>`, `..._end`, `..._range`
//! - **Precomputed bin fields**: `bin_start`, `bin_end`, `count`, `bin_range`
//! - **Selection params**: `select_point`, `select_interval`, `pan_zoom`,
//!   `legend_selection_<field>`
//! - **File references**: `./@file` / `/@file` prefixes of server-hosted data

use const_format::concatcp;

// ============================================================================
// Datasets
// ============================================================================

/// Dataset name Vega assigns to values embedded directly in the spec
pub const INLINE_DATASET: &str = "data_0";

/// Dataset name Vega assigns to the primary source (URL or row values)
pub const SOURCE_DATASET: &str = "source_0";

/// Prefixes of data handles that refer to files served by the notebook server
pub const FILE_REFERENCE_PREFIXES: &[&str] = &["./@file", "/@file"];

/// Check whether a data handle is a server file reference
pub fn is_file_reference(data: &str) -> bool {
    FILE_REFERENCE_PREFIXES
        .iter()
        .any(|prefix| data.starts_with(prefix))
}

// ============================================================================
// Vega-Lite derived bin fields
// ============================================================================

/// Maximum bin count Vega-Lite uses for `bin: true`
pub const DEFAULT_MAX_BINS: usize = 10;

const BIN_PREFIX: &str = concatcp!("bin_maxbins_", DEFAULT_MAX_BINS, "_");

/// Field Vega-Lite writes the bin start into: `bin_maxbins_10_<field>`
pub fn bin_field(field: &str) -> String {
    format!("{}{}", BIN_PREFIX, field)
}

/// Field Vega-Lite writes the bin end into: `bin_maxbins_10_<field>_end`
pub fn bin_end_field(field: &str) -> String {
    format!("{}{}_end", BIN_PREFIX, field)
}

/// Field Vega-Lite writes the formatted bin range into: `bin_maxbins_10_<field>_range`
pub fn bin_range_field(field: &str) -> String {
    format!("{}{}_range", BIN_PREFIX, field)
}

// ============================================================================
// Precomputed bins
// ============================================================================

/// Bin start column of precomputed bin values
pub const BIN_START: &str = "bin_start";

/// Bin end column of precomputed bin values
pub const BIN_END: &str = "bin_end";

/// Row count column of precomputed bin values
pub const BIN_COUNT: &str = "count";

/// Calculated `"<start> - <end>"` label used by the tooltip
pub const BIN_RANGE: &str = "bin_range";

// ============================================================================
// Selection params
// ============================================================================

/// Point selection param name
pub const SELECT_POINT: &str = "select_point";

/// Interval selection param name
pub const SELECT_INTERVAL: &str = "select_interval";

/// Scale-bound interval used for panning and zooming
pub const PAN_ZOOM: &str = "pan_zoom";

/// Hover param on the precomputed histogram
pub const HOVER: &str = "hover";

const LEGEND_SELECTION_PREFIX: &str = "legend_selection_";

/// Legend selection param for a field: `legend_selection_<field>`
pub fn legend_selection(field: &str) -> String {
    format!("{}{}", LEGEND_SELECTION_PREFIX, field)
}

/// Suffix a selection param with its layer index in a layered spec
pub fn layer_param(name: &str, layer_idx: Option<usize>) -> String {
    match layer_idx {
        Some(idx) => format!("{}_{}", name, idx),
        None => name.to_string(),
    }
}

// ============================================================================
// Field name escaping
// ============================================================================

/// Escape characters Vega-Lite treats as field path syntax (`.`, `[`, `]`, `:`)
///
/// Without escaping, `a.b` would be read as the nested field `b` of `a`.
pub fn escape_field_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for ch in name.chars() {
        if matches!(ch, '.' | '[' | ']' | ':') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// ============================================================================
// Session
// ============================================================================

/// Query parameter carrying the session id on the kernel socket URL
pub const SESSION_ID_PARAM: &str = "session_id";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_fields() {
        assert_eq!(bin_field("age"), "bin_maxbins_10_age");
        assert_eq!(bin_end_field("age"), "bin_maxbins_10_age_end");
        assert_eq!(bin_range_field("age"), "bin_maxbins_10_age_range");
    }

    #[test]
    fn test_escape_field_name() {
        assert_eq!(escape_field_name("a.b[c]:d"), "a\\.b\\[c\\]\\:d");
        assert_eq!(escape_field_name("plain"), "plain");
        assert_eq!(escape_field_name(""), "");
        assert_eq!(escape_field_name(".."), "\\.\\.");
    }

    #[test]
    fn test_file_reference() {
        assert!(is_file_reference("./@file/123-data.csv"));
        assert!(is_file_reference("/@file/123-data.csv"));
        assert!(!is_file_reference("@file/data.csv"));
        assert!(!is_file_reference("a,b\n1,2"));
    }

    #[test]
    fn test_selection_names() {
        assert_eq!(legend_selection("Origin"), "legend_selection_Origin");
        assert_eq!(layer_param(SELECT_POINT, Some(2)), "select_point_2");
        assert_eq!(layer_param(SELECT_POINT, None), "select_point");
    }
}
