//! Table summarization: field types, statistics and histogram bins from a DataFrame
//!
//! Produces the metadata a [`ColumnChartSpecModel`] consumes. Statistics are
//! only computed for numeric columns; every column gets row, null and
//! distinct counts. NaN and infinities count as values but are left out of
//! the distribution and the bins.

use crate::chart::ColumnChartSpecModel;
use crate::reader::{DataHandle, DataSourceResolver};
use crate::types::{BinValue, BinValues, ChartOptions, ColumnHeaderStats, ColumnName, FieldType, FieldTypes};
use crate::{ColchartError, DataFrame, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Options for [`TableSummary::from_dataframe`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Number of equal-width histogram bins per numeric column
    pub bin_count: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self { bin_count: 10 }
    }
}

/// Field types, statistics and bins of every column in a table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableSummary {
    pub field_types: FieldTypes,
    pub stats: HashMap<ColumnName, ColumnHeaderStats>,
    pub bin_values: HashMap<ColumnName, BinValues>,
}

/// Map a polars dtype to the field type used for charting
pub fn field_type_of(dtype: &DataType) -> FieldType {
    match dtype {
        d if d.is_integer() => FieldType::Integer,
        d if d.is_float() => FieldType::Number,
        DataType::Boolean => FieldType::Boolean,
        DataType::Date => FieldType::Date,
        DataType::Datetime(_, _) => FieldType::Datetime,
        DataType::Time => FieldType::Time,
        DataType::String | DataType::Categorical(..) | DataType::Enum(..) => FieldType::String,
        _ => FieldType::Unknown,
    }
}

fn stat_error(column: &str, e: PolarsError) -> ColchartError {
    ColchartError::ReaderError(format!("Failed to summarize column '{}': {}", column, e))
}

impl TableSummary {
    /// Summarize every column of `df`
    ///
    /// # Errors
    ///
    /// Returns `ColchartError::ConfigError` for a zero bin count and
    /// `ColchartError::ReaderError` if a column cannot be aggregated.
    pub fn from_dataframe(df: &DataFrame, options: &SummaryOptions) -> Result<Self> {
        if options.bin_count == 0 {
            return Err(ColchartError::ConfigError(
                "bin_count must be at least 1".to_string(),
            ));
        }

        let mut summary = TableSummary::default();

        for column in df.get_columns() {
            let name = column.name().to_string();
            let series = column.as_materialized_series();
            let field_type = field_type_of(series.dtype());
            tracing::debug!(column = %name, %field_type, "summarizing column");

            let mut stats = ColumnHeaderStats {
                total: Some(series.len() as u64),
                nulls: Some(series.null_count() as u64),
                unique: Some(series.n_unique().map_err(|e| stat_error(&name, e))? as u64),
                ..Default::default()
            };

            if field_type.is_numeric() {
                let floats = series
                    .cast(&DataType::Float64)
                    .map_err(|e| stat_error(&name, e))?;
                let finite = finite_values(floats.f64().map_err(|e| stat_error(&name, e))?);

                fill_distribution(&mut stats, &finite).map_err(|e| stat_error(&name, e))?;

                if let (Some(min), Some(max)) = (stats.min, stats.max) {
                    let bins = equal_width_bins(&finite, min, max, options.bin_count);
                    summary.bin_values.insert(name.clone(), bins);
                }
            }

            summary.field_types.insert(name.clone(), field_type);
            summary.stats.insert(name, stats);
        }

        Ok(summary)
    }

    /// Build a chart model for the summarized table
    pub fn into_model(
        self,
        data: DataHandle,
        options: ChartOptions,
        resolver: &DataSourceResolver,
    ) -> Result<ColumnChartSpecModel> {
        ColumnChartSpecModel::with_resolver(
            data,
            self.field_types,
            self.stats,
            self.bin_values,
            options,
            resolver,
        )
    }
}

/// Null out NaN and infinities
fn finite_values(ca: &Float64Chunked) -> Float64Chunked {
    ca.into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect()
}

/// Min, max and linear-interpolated quantiles of the non-null values
fn fill_distribution(stats: &mut ColumnHeaderStats, ca: &Float64Chunked) -> PolarsResult<()> {
    stats.min = ca.min();
    stats.max = ca.max();
    stats.p25 = ca.quantile(0.25, QuantileMethod::Linear)?;
    stats.median = ca.median();
    stats.p75 = ca.quantile(0.75, QuantileMethod::Linear)?;
    stats.p95 = ca.quantile(0.95, QuantileMethod::Linear)?;
    Ok(())
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
/// A constant column collapses into a single `[v, v]` bin.
fn equal_width_bins(ca: &Float64Chunked, min: f64, max: f64, bin_count: usize) -> BinValues {
    let values = ca.into_iter().flatten();

    let width = (max - min) / bin_count as f64;
    if width <= 0.0 || !width.is_finite() {
        return vec![BinValue {
            bin_start: min,
            bin_end: max,
            count: values.count() as u64,
        }];
    }

    let mut counts = vec![0u64; bin_count];
    for value in values {
        let idx = (((value - min) / width).floor() as usize).min(bin_count - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| BinValue {
            bin_start: min + width * i as f64,
            bin_end: if i + 1 == bin_count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}
