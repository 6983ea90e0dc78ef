//! Per-type column chart rendering for the Vega-Lite writer
//!
//! Each chartable field type has a renderer that merges its marks and
//! encodings into the shared base spec. Histograms come as two layers: the
//! visible bars, and a full-height transparent copy that carries the tooltip,
//! because tiny bars are too hard to hover.

use crate::types::{ColumnHeaderStats, FieldType};
use crate::{naming, SourceName};
use serde_json::{json, Map, Value};

use super::scale::band_scale;

// =============================================================================
// Palette
// =============================================================================

/// Bar color
pub const BAR_COLOR: &str = "#027864";

/// Color of the bucket holding null values
pub const NULL_COLOR: &str = "#cc4e00";

/// Muted label color
pub const LABEL_COLOR: &str = "#8b8d98";

/// Maximum bar thickness of the boolean chart, in pixels
pub const MAX_BAR_HEIGHT: u32 = 20;

/// Axis labels: scientific notation beyond +/-10000, otherwise up to two decimals
const NUMERIC_LABEL_EXPR: &str = "(datum.value >= 10000 || datum.value <= -10000) ? format(datum.value, '.2e') : format(datum.value, '.2~f')";

const BOOLEAN_LABEL_EXPR: &str =
    "datum.label === 'true' || datum.label === 'True'  ? 'True' : 'False'";

// =============================================================================
// Render context
// =============================================================================

/// Everything a renderer needs to know about the column being drawn
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Column name, escaped for use as a Vega-Lite field reference
    pub field: &'a str,
    pub field_type: FieldType,
    pub stats: Option<&'a ColumnHeaderStats>,
    pub source_name: SourceName,
}

impl RenderContext<'_> {
    /// d3 number format for tooltips: thousands-separated integers or two decimals
    fn number_format(&self) -> &'static str {
        match self.field_type {
            FieldType::Integer => ",d",
            _ => ".2f",
        }
    }

    /// d3 time format for temporal tooltips
    fn time_format(&self) -> &'static str {
        match self.field_type {
            FieldType::Date => "%Y-%m-%d",
            FieldType::Time => "%H:%M:%S",
            _ => "%Y-%m-%dT%H:%M:%S",
        }
    }
}

fn count_tooltip() -> Value {
    json!({
        "aggregate": "count",
        "type": "quantitative",
        "title": "Count",
        "format": ",d",
    })
}

fn merge(mut base: Map<String, Value>, extra: Value) -> Value {
    if let Value::Object(extra) = extra {
        base.extend(extra);
    }
    Value::Object(base)
}

// =============================================================================
// ColumnRenderer Trait
// =============================================================================

/// Trait for rendering one column's header chart onto the shared base spec
pub trait ColumnRenderer: Send + Sync {
    /// Short name, used in logs
    fn name(&self) -> &'static str;

    /// Merge this renderer's marks and encodings into `base`
    fn render(&self, base: Map<String, Value>, ctx: &RenderContext) -> Value;
}

// =============================================================================
// Temporal Renderer
// =============================================================================

/// Binned bar histogram over a temporal axis, nulls colored separately
pub struct TemporalRenderer;

impl ColumnRenderer for TemporalRenderer {
    fn name(&self) -> &'static str {
        "temporal"
    }

    fn render(&self, base: Map<String, Value>, ctx: &RenderContext) -> Value {
        let field = ctx.field;
        let format = ctx.time_format();
        let scale = band_scale(ctx.source_name);

        let x = json!({
            "field": field,
            "type": "temporal",
            "axis": null,
            "bin": true,
            "scale": scale,
        });

        // Vega-Lite labels the bin of null values with the literal range "null"
        let color = json!({
            "condition": {
                "test": format!("datum[\"{}\"] === \"null\"", naming::bin_range_field(field)),
                "value": NULL_COLOR,
            },
            "value": BAR_COLOR,
        });

        merge(
            base,
            json!({
                "layer": [
                    {
                        "mark": { "type": "bar", "color": BAR_COLOR },
                        "encoding": {
                            "x": x,
                            "y": { "aggregate": "count", "type": "quantitative", "axis": null },
                            "color": color,
                        },
                    },
                    {
                        "mark": { "type": "bar", "opacity": 0 },
                        "encoding": {
                            "x": x,
                            "y": { "aggregate": "max", "type": "quantitative", "axis": null },
                            "tooltip": [
                                {
                                    "field": naming::bin_field(field),
                                    "type": "temporal",
                                    "format": format,
                                    "bin": { "binned": true },
                                    "title": format!("{} (start)", field),
                                },
                                {
                                    "field": naming::bin_end_field(field),
                                    "type": "temporal",
                                    "format": format,
                                    "bin": { "binned": true },
                                    "title": format!("{} (end)", field),
                                },
                                count_tooltip(),
                            ],
                            "color": color,
                        },
                    },
                ],
            }),
        )
    }
}

// =============================================================================
// Numeric Renderers
// =============================================================================

/// Histogram binned by Vega-Lite itself from the raw rows
pub struct LegacyNumericRenderer;

impl ColumnRenderer for LegacyNumericRenderer {
    fn name(&self) -> &'static str {
        "numeric-legacy"
    }

    fn render(&self, base: Map<String, Value>, ctx: &RenderContext) -> Value {
        let field = ctx.field;

        merge(
            base,
            json!({
                "layer": [
                    {
                        "mark": { "type": "bar", "color": BAR_COLOR },
                        "encoding": {
                            "x": { "field": field, "type": "quantitative", "bin": true },
                            "y": { "aggregate": "count", "type": "quantitative", "axis": null },
                        },
                    },
                    {
                        "mark": { "type": "bar", "opacity": 0 },
                        "encoding": {
                            "x": {
                                "field": field,
                                "type": "quantitative",
                                "bin": true,
                                "axis": {
                                    "title": null,
                                    "labelFontSize": 8.5,
                                    "labelOpacity": 0.5,
                                    "labelExpr": NUMERIC_LABEL_EXPR,
                                },
                            },
                            "y": { "aggregate": "max", "type": "quantitative", "axis": null },
                            "tooltip": [
                                {
                                    "field": field,
                                    "type": "quantitative",
                                    "bin": true,
                                    "title": field,
                                    "format": ctx.number_format(),
                                },
                                count_tooltip(),
                            ],
                        },
                    },
                ],
            }),
        )
    }
}

/// Histogram drawn straight from precomputed `[bin_start, bin_end, count]` rows
pub struct PrecomputedNumericRenderer;

impl ColumnRenderer for PrecomputedNumericRenderer {
    fn name(&self) -> &'static str {
        "numeric-precomputed"
    }

    fn render(&self, base: Map<String, Value>, ctx: &RenderContext) -> Value {
        let format = ctx.number_format();
        // Tick labels only at the distribution statistics that are present
        let tick_values = ctx
            .stats
            .map(ColumnHeaderStats::present_quantiles)
            .unwrap_or_default();

        merge(
            base,
            json!({
                "layer": [
                    {
                        "mark": {
                            "type": "bar",
                            "color": BAR_COLOR,
                            "stroke": BAR_COLOR,
                            "strokeWidth": 0,
                        },
                        "params": [
                            {
                                "name": naming::HOVER,
                                "select": { "type": "point", "on": "mouseover" },
                            },
                        ],
                        "encoding": {
                            "x": {
                                "field": naming::BIN_START,
                                "type": "quantitative",
                                "bin": { "binned": true, "step": 2 },
                            },
                            "x2": { "field": naming::BIN_END, "axis": null },
                            "y": { "field": naming::BIN_COUNT, "type": "quantitative", "axis": null },
                            "strokeWidth": {
                                "condition": { "param": naming::HOVER, "empty": false, "value": 0.5 },
                                "value": 0,
                            },
                        },
                    },
                    {
                        "mark": { "type": "bar", "opacity": 0 },
                        "encoding": {
                            "x": {
                                "field": naming::BIN_START,
                                "type": "quantitative",
                                "bin": { "binned": true, "step": 2 },
                                "axis": {
                                    "title": null,
                                    "labelFontSize": 8.5,
                                    "labelOpacity": 0.5,
                                    "labelExpr": NUMERIC_LABEL_EXPR,
                                    "values": tick_values,
                                },
                            },
                            "x2": { "field": naming::BIN_END },
                            "y": { "aggregate": "max", "type": "quantitative", "axis": null },
                            "tooltip": [
                                { "field": naming::BIN_RANGE, "type": "nominal", "title": ctx.field },
                                {
                                    "field": naming::BIN_COUNT,
                                    "type": "quantitative",
                                    "title": "Count",
                                    "format": ",d",
                                },
                            ],
                        },
                        "transform": [
                            {
                                "calculate": format!(
                                    "format(datum.{start}, '{fmt}') + ' - ' + format(datum.{end}, '{fmt}')",
                                    start = naming::BIN_START,
                                    end = naming::BIN_END,
                                    fmt = format
                                ),
                                "as": naming::BIN_RANGE,
                            },
                        ],
                    },
                ],
            }),
        )
    }
}

// =============================================================================
// Boolean Renderer
// =============================================================================

/// Horizontal count bars per value with the count printed beside each bar
pub struct BooleanRenderer;

impl ColumnRenderer for BooleanRenderer {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn render(&self, base: Map<String, Value>, ctx: &RenderContext) -> Value {
        let field = ctx.field;

        merge(
            base,
            json!({
                "mark": { "type": "bar", "color": BAR_COLOR },
                "encoding": {
                    "y": {
                        "field": field,
                        "type": "nominal",
                        "axis": {
                            "labelExpr": BOOLEAN_LABEL_EXPR,
                            "tickWidth": 0,
                            "title": null,
                            "labelColor": LABEL_COLOR,
                        },
                    },
                    "x": {
                        "aggregate": "count",
                        "type": "quantitative",
                        "axis": null,
                        "scale": { "type": "linear" },
                    },
                    "tooltip": [
                        { "field": field, "type": "nominal", "title": "Value" },
                        count_tooltip(),
                    ],
                },
                "layer": [
                    {
                        "mark": { "type": "bar", "color": BAR_COLOR, "height": MAX_BAR_HEIGHT },
                    },
                    {
                        "mark": {
                            "type": "text",
                            "align": "left",
                            "baseline": "middle",
                            "dx": 3,
                            "color": LABEL_COLOR,
                        },
                        "encoding": {
                            "text": { "aggregate": "count", "type": "quantitative" },
                        },
                    },
                ],
            }),
        )
    }
}
