/*!
# colchart - column header charts for tabular data

Compiles per-column type and statistics metadata into small Vega-Lite
specifications, one per column, suitable for rendering above a table header.

## Example

```rust,ignore
use colchart::{ChartOptions, ColumnChartSpecModel, DataHandle, FieldType};
use std::collections::HashMap;

let model = ColumnChartSpecModel::new(
    DataHandle::Text("x\n1\n2\n3".to_string()),
    HashMap::from([("x".to_string(), FieldType::Integer)]),
    HashMap::new(),
    HashMap::new(),
    ChartOptions::with_charts(),
)?;

let summary = model.get_header_summary("x")?;
println!("{}", summary.spec.unwrap());
```

## Architecture

- [`reader`] - classifies a data handle (file reference, data URL, CSV text,
  in-memory rows) into a Vega-Lite data spec plus the named dataset it lands in
- [`writer`] - the type-dispatched Vega-Lite builders and padding expressions
- [`chart`] - the immutable per-table facade that ties stats, bins and data together
- [`summary`] - derives field types, stats and bins from a polars `DataFrame`
- [`selection`] - adds point/interval/legend/pan-zoom selection params to a spec
- [`session`] - kernel WebSocket URL construction
*/

pub mod chart;
pub mod config;
pub mod naming;
pub mod reader;
pub mod selection;
pub mod session;
pub mod summary;
pub mod types;
pub mod writer;

// Re-export key types for convenience
pub use chart::{ColumnChartSpecModel, ColumnStatsStore, HeaderSummary};
pub use config::Config;
pub use reader::{DataHandle, DataSourceResolver, DataSpec, FormatRegistry, SourceName};
pub use types::{BinValue, BinValues, ChartOptions, ColumnHeaderStats, ColumnName, FieldType};

// DataFrame abstraction (wraps Polars)
pub use polars::prelude::DataFrame;

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum ColchartError {
    /// The data handle could not be decoded (bad base64, bad UTF-8, bad CSV)
    #[error("Unrecognized data encoding: {0}")]
    UnrecognizedDataEncoding(String),

    /// A column was queried that has no registered field type
    #[error("Unknown column type for column '{0}'")]
    UnknownColumnType(String),

    /// A field type outside the closed set reached the dispatch boundary
    #[error("Unreachable field type variant: {0}")]
    UnreachableTypeVariant(String),

    #[error("Data source error: {0}")]
    ReaderError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, ColchartError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
