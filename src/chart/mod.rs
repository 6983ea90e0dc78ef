//! Column chart facade
//!
//! A [`ColumnChartSpecModel`] is built once per displayed table. Construction
//! classifies the table data exactly once; afterwards the model is read-only
//! and answers per-column summary queries, compiling Vega-Lite specs on demand.
//!
//! # Example
//!
//! ```rust,ignore
//! use colchart::{ChartOptions, ColumnChartSpecModel, DataHandle, FieldType};
//! use std::collections::HashMap;
//!
//! let model = ColumnChartSpecModel::new(
//!     DataHandle::Text("flag\ntrue\nfalse".into()),
//!     HashMap::from([("flag".to_string(), FieldType::Boolean)]),
//!     HashMap::new(),
//!     HashMap::new(),
//!     ChartOptions::with_charts(),
//! )?;
//! let summary = model.get_header_summary("flag")?;
//! ```

mod store;

pub use store::ColumnStatsStore;

use crate::reader::{DataHandle, DataSourceResolver, DataSpec, SourceName};
use crate::types::{BinValues, ChartOptions, ColumnHeaderStats, ColumnName, FieldType, FieldTypes};
use crate::writer::{ColumnSpecInput, VegaLiteWriter};
use crate::{ColchartError, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

static EMPTY: LazyLock<ColumnChartSpecModel> = LazyLock::new(|| ColumnChartSpecModel {
    field_types: FieldTypes::new(),
    store: ColumnStatsStore::default(),
    data_spec: DataSpec::InlineValues { rows: Vec::new() },
    source_name: SourceName::Source0,
    has_data: false,
    options: ChartOptions::default(),
    writer: VegaLiteWriter::new(),
});

/// What a table header shows for one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderSummary {
    pub stats: Option<ColumnHeaderStats>,
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    /// Only computed when charts are enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
}

/// Immutable per-table compiler of column header charts
#[derive(Debug, Clone)]
pub struct ColumnChartSpecModel {
    field_types: FieldTypes,
    store: ColumnStatsStore,
    data_spec: DataSpec,
    source_name: SourceName,
    has_data: bool,
    options: ChartOptions,
    writer: VegaLiteWriter,
}

impl ColumnChartSpecModel {
    /// Build a model using the default resolver (Arrow decoder, local server base)
    pub fn new(
        data: DataHandle,
        field_types: FieldTypes,
        stats: HashMap<ColumnName, ColumnHeaderStats>,
        bin_values: HashMap<ColumnName, BinValues>,
        options: ChartOptions,
    ) -> Result<Self> {
        Self::with_resolver(
            data,
            field_types,
            stats,
            bin_values,
            options,
            &DataSourceResolver::default(),
        )
    }

    /// Build a model, classifying `data` with an explicit resolver
    ///
    /// # Errors
    ///
    /// Returns `ColchartError::UnrecognizedDataEncoding` if the data handle
    /// cannot be decoded.
    pub fn with_resolver(
        data: DataHandle,
        field_types: FieldTypes,
        stats: HashMap<ColumnName, ColumnHeaderStats>,
        bin_values: HashMap<ColumnName, BinValues>,
        options: ChartOptions,
        resolver: &DataSourceResolver,
    ) -> Result<Self> {
        let has_data = !data.is_absent();
        let (data_spec, source_name) = resolver.resolve(&data)?;

        Ok(Self {
            field_types,
            store: ColumnStatsStore::new(stats, bin_values),
            data_spec,
            source_name,
            has_data,
            options,
            writer: VegaLiteWriter::new(),
        })
    }

    /// Shared model with no data and charts disabled
    pub fn empty() -> &'static ColumnChartSpecModel {
        &EMPTY
    }

    /// Replace the spec writer (e.g. to emit `$schema` for standalone output)
    pub fn with_writer(mut self, writer: VegaLiteWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn source_name(&self) -> SourceName {
        self.source_name
    }

    pub fn data_spec(&self) -> &DataSpec {
        &self.data_spec
    }

    pub fn field_type(&self, column: &str) -> Option<FieldType> {
        self.field_types.get(column).copied()
    }

    pub fn get_column_stats(&self, column: &str) -> Option<&ColumnHeaderStats> {
        self.store.stats(column)
    }

    /// Stats, type and (if charts are enabled) spec of a column
    ///
    /// # Errors
    ///
    /// With charts enabled, returns `ColchartError::UnknownColumnType` for a
    /// column that has no registered field type.
    pub fn get_header_summary(&self, column: &str) -> Result<HeaderSummary> {
        let spec = if self.options.include_charts {
            self.build_spec(column)?
        } else {
            None
        };

        Ok(HeaderSummary {
            stats: self.store.stats(column).cloned(),
            field_type: self.field_type(column),
            spec,
        })
    }

    /// Compile the Vega-Lite spec of a column; `None` when the column is not
    /// chartable or the model has no data
    pub fn build_spec(&self, column: &str) -> Result<Option<Value>> {
        if !self.has_data {
            return Ok(None);
        }

        let field_type = self
            .field_type(column)
            .ok_or_else(|| ColchartError::UnknownColumnType(column.to_string()))?;

        Ok(self.writer.write_column(&ColumnSpecInput {
            column,
            field_type,
            stats: self.store.stats(column),
            bins: self.store.bins(column),
            data: &self.data_spec,
            source_name: self.source_name,
            use_pre_computed_values: self.options.use_pre_computed_values,
        }))
    }
}
