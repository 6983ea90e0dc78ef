//! Interactive selection for arbitrary Vega-Lite specs
//!
//! [`make_selectable`] adds the params a host needs to report chart
//! selections back to the kernel:
//!
//! - `legend_selection_<field>`: click a legend entry to filter by that field
//! - `select_point` / `select_interval`: click or brush marks
//! - `pan_zoom`: meta+wheel / meta+drag bound to the scales
//!
//! In layered specs chart selections get a `_<layer index>` suffix so names
//! stay unique across layers; legend selections and `pan_zoom` go on the first
//! layer only.

mod params;

pub use params::{selection_param_names, SelectionType, LEGEND_CHANNELS};

use params::{chart_param, has_legend_param, legend_param, pan_zoom_param};
use serde_json::{json, Map, Value};

/// Marks that only make sense as static composites
const UNSELECTABLE_MARKS: &[&str] = &["errorbar", "errorband", "boxplot"];

/// Which chart selections to add
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartSelection {
    /// Whatever suits the mark best
    #[default]
    All,
    Point,
    Interval,
    Disabled,
}

impl ChartSelection {
    fn allows(&self, kind: SelectionType) -> bool {
        match self {
            ChartSelection::All => true,
            ChartSelection::Point => kind == SelectionType::Point,
            ChartSelection::Interval => kind == SelectionType::Interval,
            ChartSelection::Disabled => false,
        }
    }
}

/// Which legend fields to make selectable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldSelection {
    #[default]
    All,
    Disabled,
    /// Only these fields; an empty list disables legend selection
    Fields(Vec<String>),
}

impl FieldSelection {
    fn allows(&self, field: &str) -> bool {
        match self {
            FieldSelection::All => true,
            FieldSelection::Disabled => false,
            FieldSelection::Fields(fields) => fields.iter().any(|f| f == field),
        }
    }

    fn is_enabled(&self) -> bool {
        match self {
            FieldSelection::All => true,
            FieldSelection::Disabled => false,
            FieldSelection::Fields(fields) => !fields.is_empty(),
        }
    }
}

/// Options for [`make_selectable`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOptions {
    pub chart_selection: ChartSelection,
    pub field_selection: FieldSelection,
}

/// The mark type of a unit spec, whether written as a string or an object
fn mark_type(spec: &Value) -> Option<&str> {
    match &spec["mark"] {
        Value::String(mark) => Some(mark),
        Value::Object(mark) => mark.get("type").and_then(Value::as_str),
        _ => None,
    }
}

/// Selection kinds that read well on a given mark
fn best_selections(mark: &str) -> &'static [SelectionType] {
    match mark {
        "arc" | "area" => &[SelectionType::Point],
        "line" => &[],
        _ => &[SelectionType::Point, SelectionType::Interval],
    }
}

/// Add selection params to a spec, returning a new spec
///
/// Specs that cannot carry selections (no mark, composite statistical marks,
/// geoshapes, layered specs with their own top-level params, concatenations)
/// are returned unchanged.
pub fn make_selectable(spec: &Value, options: &SelectionOptions) -> Value {
    let chart_enabled = options.chart_selection != ChartSelection::Disabled;
    if !chart_enabled && !options.field_selection.is_enabled() {
        return spec.clone();
    }

    if let Some(layers) = spec["layer"].as_array() {
        let has_params = spec["params"].as_array().is_some_and(|p| !p.is_empty());
        if has_params {
            return spec.clone();
        }

        let mut out = spec.clone();
        out["layer"] = Value::Array(
            layers
                .iter()
                .enumerate()
                .map(|(idx, layer)| selectable_layer(layer, idx, options))
                .collect(),
        );
        return out;
    }

    let Some(mark) = mark_type(spec) else {
        return spec.clone();
    };
    if mark == "geoshape" || UNSELECTABLE_MARKS.contains(&mark) {
        return spec.clone();
    }

    let mut out = spec.clone();
    let mut added = legend_params(spec, options);
    added.extend(chart_params(spec, mark, None, options));
    let opacity_params: Vec<Value> = added.clone();
    added.push(pan_zoom_param());

    apply_params(&mut out, added, &opacity_params);
    out
}

fn selectable_layer(layer: &Value, idx: usize, options: &SelectionOptions) -> Value {
    let Some(mark) = mark_type(layer) else {
        return layer.clone();
    };
    if mark == "geoshape" {
        return layer.clone();
    }

    let mut added = Vec::new();
    if idx == 0 {
        added.extend(legend_params(layer, options));
    }
    if !UNSELECTABLE_MARKS.contains(&mark) {
        added.extend(chart_params(layer, mark, Some(idx), options));
    }
    let opacity_params: Vec<Value> = added.clone();
    if idx == 0 {
        added.push(pan_zoom_param());
    }

    let mut out = layer.clone();
    apply_params(&mut out, added, &opacity_params);
    out
}

/// Legend selections for each distinct field on a legend channel
fn legend_params(spec: &Value, options: &SelectionOptions) -> Vec<Value> {
    let existing = spec["params"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    if !options.field_selection.is_enabled() || has_legend_param(existing) {
        return Vec::new();
    }

    let mut fields: Vec<&str> = Vec::new();
    for channel in LEGEND_CHANNELS {
        if let Some(field) = spec["encoding"][*channel]["field"].as_str() {
            if options.field_selection.allows(field) && !fields.contains(&field) {
                fields.push(field);
            }
        }
    }
    fields.into_iter().map(legend_param).collect()
}

fn chart_params(
    spec: &Value,
    mark: &str,
    layer_idx: Option<usize>,
    options: &SelectionOptions,
) -> Vec<Value> {
    best_selections(mark)
        .iter()
        .filter(|kind| options.chart_selection.allows(**kind))
        .map(|kind| chart_param(*kind, spec, layer_idx))
        .collect()
}

/// Append params, normalize the mark to object form, and dim unselected marks
fn apply_params(spec: &mut Value, added: Vec<Value>, opacity_params: &[Value]) {
    let Value::Object(obj) = spec else {
        return;
    };

    if let Some(Value::String(mark)) = obj.get("mark") {
        let mark = mark.clone();
        obj.insert("mark".to_string(), json!({ "type": mark }));
    }

    if !opacity_params.is_empty() {
        let encoding = obj
            .entry("encoding")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(encoding) = encoding {
            if !encoding.contains_key("opacity") {
                let tests: Vec<Value> = opacity_params
                    .iter()
                    .filter_map(|p| p["name"].as_str())
                    .map(|name| json!({ "param": name }))
                    .collect();
                encoding.insert(
                    "opacity".to_string(),
                    json!({
                        "condition": { "test": { "and": tests }, "value": 1 },
                        "value": 0.2,
                    }),
                );
            }
        }
    }

    let params = obj
        .entry("params")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(params) = params {
        params.extend(added);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cars() -> Value {
        json!({
            "config": {"view": {"continuousHeight": 300}},
            "data": {"url": "data/cars.json"},
            "encoding": {
                "color": {"field": "Origin", "type": "nominal"},
                "x": {"field": "Horsepower", "type": "quantitative"},
                "y": {"field": "Miles_per_Gallon", "type": "quantitative"},
            },
            "mark": {"type": "point"},
        })
    }

    fn disabled() -> SelectionOptions {
        SelectionOptions {
            chart_selection: ChartSelection::Disabled,
            field_selection: FieldSelection::Disabled,
        }
    }

    #[test]
    fn test_string_and_object_marks_are_equivalent() {
        let a = make_selectable(&json!({"mark": "point"}), &SelectionOptions::default());
        let b = make_selectable(&json!({"mark": {"type": "point"}}), &SelectionOptions::default());
        assert_eq!(a, b);
        assert_eq!(a["mark"], json!({"type": "point"}));
    }

    #[test]
    fn test_disabled_returns_input() {
        let spec = json!({"mark": "point"});
        let out = make_selectable(&spec, &disabled());
        assert_eq!(out, spec);
        assert!(selection_param_names(&out).is_empty());
    }

    #[test]
    fn test_overlapping_encodings() {
        let out = make_selectable(&cars(), &SelectionOptions::default());
        assert_eq!(
            selection_param_names(&out),
            vec!["legend_selection_Origin", "select_point", "select_interval", "pan_zoom"]
        );
        assert_eq!(out["encoding"]["opacity"]["value"], 0.2);
        assert_eq!(
            out["encoding"]["opacity"]["condition"]["test"]["and"],
            json!([
                {"param": "legend_selection_Origin"},
                {"param": "select_point"},
                {"param": "select_interval"},
            ])
        );
    }

    #[test]
    fn test_field_selection_disabled_or_empty() {
        let off = make_selectable(
            &cars(),
            &SelectionOptions {
                field_selection: FieldSelection::Disabled,
                ..Default::default()
            },
        );
        assert_eq!(
            selection_param_names(&off),
            vec!["select_point", "select_interval", "pan_zoom"]
        );

        let empty = make_selectable(
            &cars(),
            &SelectionOptions {
                field_selection: FieldSelection::Fields(Vec::new()),
                ..Default::default()
            },
        );
        assert_eq!(off, empty);
    }

    #[test]
    fn test_field_selection_allow_list() {
        let spec = json!({
            "mark": "point",
            "encoding": {
                "color": {"field": "colorField", "type": "nominal"},
                "size": {"field": "sizeField", "type": "quantitative"},
            },
        });
        let all = make_selectable(&spec, &SelectionOptions::default());
        assert_eq!(
            selection_param_names(&all),
            vec![
                "legend_selection_colorField",
                "legend_selection_sizeField",
                "select_point",
                "select_interval",
                "pan_zoom",
            ]
        );

        let only_size = make_selectable(
            &spec,
            &SelectionOptions {
                field_selection: FieldSelection::Fields(vec!["sizeField".to_string()]),
                ..Default::default()
            },
        );
        assert_eq!(
            selection_param_names(&only_size)[0],
            "legend_selection_sizeField"
        );
        assert_eq!(selection_param_names(&only_size).len(), 4);
    }

    #[test]
    fn test_chart_selection_point_only() {
        let out = make_selectable(
            &cars(),
            &SelectionOptions {
                chart_selection: ChartSelection::Point,
                field_selection: FieldSelection::Disabled,
            },
        );
        assert_eq!(selection_param_names(&out), vec!["select_point", "pan_zoom"]);
    }

    #[test]
    fn test_existing_legend_selection() {
        let spec = json!({
            "encoding": {
                "color": {"field": "series", "type": "nominal"},
                "opacity": {"condition": {"param": "param_1", "value": 1}, "value": 0.2},
                "x": {"field": "date", "type": "temporal"},
                "y": {"aggregate": "sum", "field": "count", "type": "quantitative"},
            },
            "mark": {"type": "area"},
            "params": [
                {"bind": "legend", "name": "param_1", "select": {"fields": ["series"], "type": "point"}},
            ],
        });
        let out = make_selectable(&spec, &SelectionOptions::default());
        assert_eq!(
            selection_param_names(&out),
            vec!["param_1", "select_point", "pan_zoom"]
        );
        // Existing opacity encoding is kept
        assert_eq!(out["encoding"]["opacity"], spec["encoding"]["opacity"]);
    }

    #[test]
    fn test_multi_layer_with_errorbar() {
        let spec = json!({
            "layer": [
                {
                    "mark": {"type": "errorbar", "ticks": true},
                    "encoding": {
                        "x": {"field": "yield_center", "type": "quantitative"},
                        "xError": {"field": "yield_error"},
                        "y": {"field": "variety", "type": "nominal"},
                    },
                },
                {
                    "mark": {"type": "point", "color": "black", "filled": true},
                    "encoding": {"x": {"field": "yield_center", "type": "quantitative"}},
                },
            ],
            "data": {"name": "source"},
        });
        let out = make_selectable(
            &spec,
            &SelectionOptions {
                chart_selection: ChartSelection::All,
                ..Default::default()
            },
        );
        assert_eq!(
            selection_param_names(&out),
            vec!["pan_zoom", "select_point_1", "select_interval_1"]
        );
        // Errorbar layer gets no opacity condition
        assert!(out["layer"][0]["encoding"].get("opacity").is_none());
    }

    #[test]
    fn test_multi_layer_each_layer_selectable() {
        let spec = json!({
            "layer": [
                {"mark": {"type": "bar"}, "encoding": {"x": {"field": "a"}, "y": {"field": "b"}}},
                {"mark": {"type": "text"}, "encoding": {"x": {"field": "a"}}},
                {"mark": {"type": "text"}, "encoding": {"x": {"field": "a"}}},
            ],
        });
        let out = make_selectable(&spec, &SelectionOptions::default());
        assert_eq!(
            selection_param_names(&out),
            vec![
                "select_point_0",
                "select_interval_0",
                "pan_zoom",
                "select_point_1",
                "select_interval_1",
                "select_point_2",
                "select_interval_2",
            ]
        );
    }

    #[test]
    fn test_layered_with_existing_params_unchanged() {
        let spec = json!({
            "layer": [
                {"mark": {"type": "bar"}, "name": "view_21"},
                {"mark": {"type": "rule"}},
            ],
            "params": [
                {"name": "param_22", "select": {"type": "point", "encodings": ["x"]}, "views": ["view_21"]},
            ],
        });
        let out = make_selectable(&spec, &SelectionOptions::default());
        assert_eq!(out, spec);
        assert_eq!(selection_param_names(&out), vec!["param_22"]);
    }

    #[test]
    fn test_geoshape_unchanged() {
        let spec = json!({
            "mark": "geoshape",
            "encoding": {
                "color": {"datum": "red", "type": "nominal"},
                "x": {"field": "x", "type": "quantitative"},
            },
        });
        let out = make_selectable(&spec, &SelectionOptions::default());
        assert_eq!(out, spec);
        assert!(selection_param_names(&out).is_empty());
    }

    #[test]
    fn test_composite_marks_unchanged() {
        for mark in ["errorbar", "errorband", "boxplot"] {
            let spec = json!({"mark": mark});
            let out = make_selectable(&spec, &SelectionOptions::default());
            assert_eq!(out, spec);
            assert!(selection_param_names(&out).is_empty());
        }
    }

    #[test]
    fn test_line_gets_only_pan_zoom() {
        let out = make_selectable(&json!({"mark": "line"}), &SelectionOptions::default());
        assert_eq!(selection_param_names(&out), vec!["pan_zoom"]);
        assert!(out.get("encoding").is_none());
    }
}
