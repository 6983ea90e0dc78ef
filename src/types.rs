//! Column metadata types shared by the reader, writer and chart facade.

use crate::{ColchartError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Name of a column in the dataset, unique within that dataset
pub type ColumnName = String;

/// Field type per column
pub type FieldTypes = HashMap<ColumnName, FieldType>;

/// Semantic type of a column, deciding how its header chart is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Date,
    Datetime,
    Time,
    Integer,
    Number,
    Boolean,
    String,
    Unknown,
}

impl FieldType {
    /// All variants, in declaration order
    pub const ALL: [FieldType; 8] = [
        FieldType::Date,
        FieldType::Datetime,
        FieldType::Time,
        FieldType::Integer,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::String,
        FieldType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Time => "time",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::String => "string",
            FieldType::Unknown => "unknown",
        }
    }

    /// Integer or number
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Number)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ColchartError;

    /// Parse a type name produced upstream. Names outside the closed set
    /// are an invariant violation, not a degraded "unknown".
    fn from_str(s: &str) -> Result<Self> {
        FieldType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| ColchartError::UnreachableTypeVariant(s.to_string()))
    }
}

/// Precomputed descriptive statistics of a column
///
/// Ordering (`min <= p25 <= median <= p75 <= p95 <= max`) is assumed by the
/// charts but not validated here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnHeaderStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p25: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p75: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p95: Option<f64>,
}

impl ColumnHeaderStats {
    /// The six distribution statistics, in axis order, keeping only the present ones
    pub fn present_quantiles(&self) -> Vec<f64> {
        [
            self.min,
            self.p25,
            self.median,
            self.p75,
            self.p95,
            self.max,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// One precomputed histogram bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinValue {
    pub bin_start: f64,
    pub bin_end: f64,
    pub count: u64,
}

/// Ordered histogram bins; empty is the same as absent
pub type BinValues = Vec<BinValue>;

/// Construction options of a chart model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartOptions {
    /// Build specs in `get_header_summary`
    pub include_charts: bool,
    /// Prefer caller-supplied bins over re-binning the raw data
    pub use_pre_computed_values: bool,
}

impl ChartOptions {
    /// Charts on, precomputed bins off
    pub fn with_charts() -> Self {
        Self {
            include_charts: true,
            use_pre_computed_values: false,
        }
    }
}
