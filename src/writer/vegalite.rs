//! Vega-Lite JSON writer for column header charts
//!
//! # Mapping Strategy
//!
//! | field type               | renderer                                    |
//! |--------------------------|---------------------------------------------|
//! | date / datetime / time   | temporal histogram, null bucket highlighted |
//! | integer / number         | precomputed bins if opted in and present,   |
//! |                          | otherwise Vega-Lite binning of raw rows     |
//! | boolean                  | count bars labelled True / False            |
//! | string / unknown         | no chart                                    |
//!
//! All specs share the same base: data block, transparent background, no
//! axis domain line, fixed height.

pub mod layer;
pub mod scale;

use crate::reader::DataSpec;
use crate::types::{BinValues, ColumnHeaderStats, FieldType};
use crate::{naming, SourceName};
use serde_json::{json, Map, Value};

use layer::{
    BooleanRenderer, ColumnRenderer, LegacyNumericRenderer, PrecomputedNumericRenderer,
    RenderContext, TemporalRenderer,
};

/// Chart height in pixels
pub const CHART_HEIGHT: u32 = 100;

/// Vega-Lite v6 schema URL
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v6.json";

/// Everything known about one column when its spec is written
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpecInput<'a> {
    /// Unescaped column name
    pub column: &'a str,
    pub field_type: FieldType,
    pub stats: Option<&'a ColumnHeaderStats>,
    /// Precomputed bins; an empty vector counts as absent
    pub bins: Option<&'a BinValues>,
    /// Resolved table data
    pub data: &'a DataSpec,
    pub source_name: SourceName,
    pub use_pre_computed_values: bool,
}

impl ColumnSpecInput<'_> {
    /// Non-empty precomputed bins, when the caller opted into using them
    fn precomputed_bins(&self) -> Option<&BinValues> {
        self.bins
            .filter(|bins| !bins.is_empty())
            .filter(|_| self.use_pre_computed_values)
    }
}

/// Vega-Lite JSON writer
///
/// Embedded header charts are rendered without a `$schema`; standalone output
/// can opt into one.
#[derive(Debug, Clone, Default)]
pub struct VegaLiteWriter {
    schema: Option<String>,
}

impl VegaLiteWriter {
    /// Create a writer that emits no `$schema`
    pub fn new() -> Self {
        Self { schema: None }
    }

    /// Emit the Vega-Lite v6 `$schema` on every spec
    pub fn with_schema(mut self) -> Self {
        self.schema = Some(VEGA_LITE_SCHEMA.to_string());
        self
    }

    /// Write the header chart of one column, or `None` if the type is not chartable
    pub fn write_column(&self, input: &ColumnSpecInput) -> Option<Value> {
        let bins = input.precomputed_bins();
        let renderer = renderer_for(input.field_type, bins.is_some())?;

        let field = naming::escape_field_name(input.column);
        let ctx = RenderContext {
            field: &field,
            field_type: input.field_type,
            stats: input.stats,
            source_name: input.source_name,
        };

        let data = match bins {
            Some(bins) => json!({ "values": bins }),
            None => input.data.to_value(),
        };

        tracing::trace!(column = input.column, renderer = renderer.name(), "writing column spec");
        Some(renderer.render(self.base_spec(data), &ctx))
    }

    /// Shared chrome of every header chart
    fn base_spec(&self, data: Value) -> Map<String, Value> {
        let mut base = Map::new();
        if let Some(schema) = &self.schema {
            base.insert("$schema".to_string(), json!(schema));
        }
        base.insert("data".to_string(), data);
        base.insert("background".to_string(), json!("transparent"));
        base.insert(
            "config".to_string(),
            json!({
                "view": { "stroke": "transparent" },
                "axis": { "domain": false },
            }),
        );
        base.insert("height".to_string(), json!(CHART_HEIGHT));
        base
    }
}

/// Pick the renderer for a field type. Exactly one arm applies per type.
fn renderer_for(field_type: FieldType, has_precomputed_bins: bool) -> Option<&'static dyn ColumnRenderer> {
    match field_type {
        FieldType::Date | FieldType::Datetime | FieldType::Time => Some(&TemporalRenderer),
        FieldType::Integer | FieldType::Number if has_precomputed_bins => {
            Some(&PrecomputedNumericRenderer)
        }
        FieldType::Integer | FieldType::Number => Some(&LegacyNumericRenderer),
        FieldType::Boolean => Some(&BooleanRenderer),
        FieldType::String | FieldType::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BinValue;
    use pretty_assertions::assert_eq;

    fn rows() -> DataSpec {
        DataSpec::InlineValues {
            rows: vec![json!({"x": 1}), json!({"x": 2})],
        }
    }

    fn input<'a>(column: &'a str, field_type: FieldType, data: &'a DataSpec) -> ColumnSpecInput<'a> {
        ColumnSpecInput {
            column,
            field_type,
            stats: None,
            bins: None,
            data,
            source_name: SourceName::Source0,
            use_pre_computed_values: false,
        }
    }

    fn bins() -> BinValues {
        vec![
            BinValue { bin_start: 0.0, bin_end: 5.0, count: 3 },
            BinValue { bin_start: 5.0, bin_end: 10.0, count: 7 },
        ]
    }

    #[test]
    fn test_string_and_unknown_are_not_charted() {
        let writer = VegaLiteWriter::new();
        let data = rows();
        for ty in [FieldType::String, FieldType::Unknown] {
            assert_eq!(writer.write_column(&input("x", ty, &data)), None);
        }
    }

    #[test]
    fn test_every_other_type_is_charted() {
        let writer = VegaLiteWriter::new();
        let data = rows();
        for ty in FieldType::ALL {
            let spec = writer.write_column(&input("x", ty, &data));
            assert_eq!(spec.is_some(), !matches!(ty, FieldType::String | FieldType::Unknown));
        }
    }

    #[test]
    fn test_base_spec() {
        let writer = VegaLiteWriter::new();
        let data = rows();
        let spec = writer
            .write_column(&input("x", FieldType::Integer, &data))
            .unwrap();

        assert_eq!(spec["background"], "transparent");
        assert_eq!(spec["config"]["view"]["stroke"], "transparent");
        assert_eq!(spec["config"]["axis"]["domain"], false);
        assert_eq!(spec["height"], CHART_HEIGHT);
        assert_eq!(spec["data"], json!({"values": [{"x": 1}, {"x": 2}]}));
        assert!(spec.get("$schema").is_none());
    }

    #[test]
    fn test_schema_opt_in() {
        let writer = VegaLiteWriter::new().with_schema();
        let data = rows();
        let spec = writer
            .write_column(&input("x", FieldType::Boolean, &data))
            .unwrap();
        assert_eq!(spec["$schema"], VEGA_LITE_SCHEMA);
    }

    #[test]
    fn test_field_names_are_escaped() {
        let writer = VegaLiteWriter::new();
        let data = rows();
        let spec = writer
            .write_column(&input("a.b[c]:d", FieldType::Number, &data))
            .unwrap();
        assert_eq!(spec["layer"][0]["encoding"]["x"]["field"], "a\\.b\\[c\\]\\:d");

        let spec = writer
            .write_column(&input("a.b[c]:d", FieldType::Date, &data))
            .unwrap();
        assert_eq!(
            spec["layer"][1]["encoding"]["tooltip"][0]["field"],
            "bin_maxbins_10_a\\.b\\[c\\]\\:d"
        );
    }

    #[test]
    fn test_precomputed_bins_replace_data() {
        let writer = VegaLiteWriter::new();
        let data = rows();
        let bins = bins();
        let spec = writer
            .write_column(&ColumnSpecInput {
                bins: Some(&bins),
                use_pre_computed_values: true,
                ..input("x", FieldType::Number, &data)
            })
            .unwrap();

        assert_eq!(
            spec["data"],
            json!({"values": [
                {"bin_start": 0.0, "bin_end": 5.0, "count": 3},
                {"bin_start": 5.0, "bin_end": 10.0, "count": 7},
            ]})
        );
        assert_eq!(spec["layer"][0]["encoding"]["x"]["field"], "bin_start");
    }

    #[test]
    fn test_bins_ignored_without_opt_in() {
        let writer = VegaLiteWriter::new();
        let data = rows();
        let bins = bins();
        let spec = writer
            .write_column(&ColumnSpecInput {
                bins: Some(&bins),
                ..input("x", FieldType::Number, &data)
            })
            .unwrap();

        assert_eq!(spec["data"], data.to_value());
        assert_eq!(spec["layer"][0]["encoding"]["x"]["field"], "x");
    }

    #[test]
    fn test_empty_bins_fall_back_to_legacy() {
        let writer = VegaLiteWriter::new();
        let data = rows();
        let empty = BinValues::new();
        let spec = writer
            .write_column(&ColumnSpecInput {
                bins: Some(&empty),
                use_pre_computed_values: true,
                ..input("x", FieldType::Number, &data)
            })
            .unwrap();

        assert_eq!(spec["data"], data.to_value());
        assert_eq!(spec["layer"][0]["encoding"]["x"]["bin"], true);
        assert!(spec["layer"][0].get("params").is_none());
    }

    #[test]
    fn test_temporal_bins_are_not_precomputed() {
        // Precomputed bins only apply to numeric columns; temporal keeps the row data
        let writer = VegaLiteWriter::new();
        let data = rows();
        let bins = bins();
        let spec = writer
            .write_column(&ColumnSpecInput {
                bins: Some(&bins),
                use_pre_computed_values: true,
                ..input("x", FieldType::Date, &data)
            })
            .unwrap();
        assert_eq!(spec["layer"][0]["encoding"]["x"]["type"], "temporal");
    }

    #[test]
    fn test_source_name_feeds_padding_expression() {
        let writer = VegaLiteWriter::new();
        let data = rows();
        let spec = writer
            .write_column(&ColumnSpecInput {
                source_name: SourceName::Data0,
                ..input("when", FieldType::Datetime, &data)
            })
            .unwrap();
        let expr = spec["layer"][0]["encoding"]["x"]["scale"]["paddingOuter"]["expr"]
            .as_str()
            .unwrap();
        assert!(expr.starts_with("length(data('data_0')) == 2 ? 1"));
    }

    #[test]
    fn test_deterministic() {
        let writer = VegaLiteWriter::new();
        let data = rows();
        for ty in FieldType::ALL {
            let a = writer.write_column(&input("x", ty, &data));
            let b = writer.write_column(&input("x", ty, &data));
            assert_eq!(a, b);
        }
    }
}
