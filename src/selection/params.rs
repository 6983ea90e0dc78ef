//! Selection param constructors and param discovery.

use crate::naming;
use serde_json::{json, Value};

/// Kind of chart selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionType {
    Point,
    Interval,
}

/// Positional channels a chart selection projects onto
const POSITION_CHANNELS: &[&str] = &["x", "y"];

/// Encoding channels that produce a clickable legend
pub const LEGEND_CHANNELS: &[&str] = &["color", "fill", "shape", "size", "opacity", "fillOpacity"];

/// Interval brushing ignores drags with the meta key held, which belong to pan/zoom
const INTERVAL_EVENTS: &str = "[mousedown[!event.metaKey], mouseup] > mousemove[!event.metaKey]";

fn position_encodings(spec: &Value) -> Vec<&'static str> {
    POSITION_CHANNELS
        .iter()
        .copied()
        .filter(|channel| spec["encoding"].get(channel).is_some())
        .collect()
}

/// Point or interval selection param for `spec`, suffixed with its layer index if layered
pub fn chart_param(kind: SelectionType, spec: &Value, layer_idx: Option<usize>) -> Value {
    let encodings = position_encodings(spec);

    let (name, mut select) = match kind {
        SelectionType::Point => (naming::SELECT_POINT, json!({ "type": "point" })),
        SelectionType::Interval => (
            naming::SELECT_INTERVAL,
            json!({ "type": "interval", "on": INTERVAL_EVENTS }),
        ),
    };
    if !encodings.is_empty() {
        select["encodings"] = json!(encodings);
    }

    json!({
        "name": naming::layer_param(name, layer_idx),
        "select": select,
    })
}

/// Legend-bound point selection over one field
pub fn legend_param(field: &str) -> Value {
    json!({
        "name": naming::legend_selection(field),
        "select": { "type": "point", "fields": [field] },
        "bind": "legend",
    })
}

/// Scale-bound interval: meta+wheel zooms, meta+drag pans
pub fn pan_zoom_param() -> Value {
    json!({
        "name": naming::PAN_ZOOM,
        "bind": "scales",
        "select": {
            "type": "interval",
            "zoom": "wheel![event.metaKey]",
            "translate": "[mousedown[event.metaKey], window:mouseup] > window:mousemove!",
        },
    })
}

/// Whether a param list already contains a legend-bound param
pub fn has_legend_param(params: &[Value]) -> bool {
    params.iter().any(|p| p["bind"] == "legend")
}

/// Names of the selection params in a spec
///
/// Top-level params win; otherwise layered and concatenated views are
/// searched, keeping the first occurrence of each name.
pub fn selection_param_names(spec: &Value) -> Vec<String> {
    if let Some(params) = spec["params"].as_array().filter(|p| !p.is_empty()) {
        return params
            .iter()
            .filter(|p| p.get("select").is_some())
            .filter_map(|p| p["name"].as_str())
            .map(str::to_string)
            .collect();
    }

    let mut names: Vec<String> = Vec::new();
    for key in ["layer", "vconcat", "hconcat"] {
        if let Some(views) = spec[key].as_array() {
            for view in views {
                for name in selection_param_names(view) {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }
    }
    names
}
