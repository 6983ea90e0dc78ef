//! Data source classification for header charts
//!
//! A table hands its row data to the chart model in one of several shapes.
//! The reader module turns that handle into the Vega-Lite `data` block every
//! generated spec shares, plus the name of the dataset Vega will compile it
//! into (needed by expressions that count rendered rows).
//!
//! # Classification
//!
//! | handle                         | data spec            | dataset    |
//! |--------------------------------|----------------------|------------|
//! | in-memory rows                 | inline values        | `source_0` |
//! | `./@file...` / `/@file...`     | absolute URL         | `source_0` |
//! | `data:` URL, registered binary | binary + format type | `data_0`   |
//! | `data:` URL, anything else     | inline values (CSV)  | `data_0`   |
//! | other text                     | inline values (CSV)  | `data_0`   |
//!
//! # Example
//!
//! ```rust,ignore
//! use colchart::reader::{DataHandle, DataSourceResolver};
//!
//! let resolver = DataSourceResolver::default();
//! let (data_spec, source_name) = resolver.resolve(&DataHandle::Text("a,b\n1,2".into()))?;
//! ```

use crate::{naming, ColchartError, Result};
use serde_json::{json, Map, Value};
use std::sync::LazyLock;
use url::Url;

pub mod data;
pub mod format;

pub use data::{dataframe_to_values, parse_csv_rows, CsvOptions, Row};
pub use format::{ArrowIpcFormat, FormatDecoder, FormatRegistry};

/// Default server base used to resolve file references
pub const DEFAULT_REMOTE_BASE: &str = "http://localhost:2718/";

static DEFAULT_REMOTE_BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_REMOTE_BASE).expect("DEFAULT_REMOTE_BASE is a valid URL"));

/// Row data handed to a chart model
#[derive(Debug, Clone, PartialEq)]
pub enum DataHandle {
    /// Rows already materialized in memory
    Rows(Vec<Row>),
    /// File reference, data URL or delimited text
    Text(String),
}

impl DataHandle {
    /// An empty text handle carries no data at all; an empty row set is still a dataset
    pub fn is_absent(&self) -> bool {
        matches!(self, DataHandle::Text(text) if text.is_empty())
    }
}

impl From<&str> for DataHandle {
    fn from(text: &str) -> Self {
        DataHandle::Text(text.to_string())
    }
}

impl From<Vec<Row>> for DataHandle {
    fn from(rows: Vec<Row>) -> Self {
        DataHandle::Rows(rows)
    }
}

/// Where a spec's row data comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSpec {
    /// Data fetched by the renderer from a URL
    Url { href: String },
    /// Rows embedded in the spec
    InlineValues { rows: Vec<Value> },
    /// Encoded binary data (Arrow IPC) decoded by the renderer's format loader
    Binary { format: String, bytes: Vec<u8> },
}

impl DataSpec {
    /// Render as a Vega-Lite `data` block
    pub fn to_value(&self) -> Value {
        match self {
            DataSpec::Url { href } => json!({ "url": href }),
            DataSpec::InlineValues { rows } => json!({ "values": rows }),
            DataSpec::Binary { format, bytes } => json!({
                "values": bytes,
                "format": { "type": format },
            }),
        }
    }
}

/// Dataset name Vega compiles the spec's data into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceName {
    /// `data_0`: values embedded directly in the spec
    Data0,
    /// `source_0`: the primary source (URL or row values)
    Source0,
}

impl SourceName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Data0 => naming::INLINE_DATASET,
            SourceName::Source0 => naming::SOURCE_DATASET,
        }
    }
}

impl std::fmt::Display for SourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies data handles into `(DataSpec, SourceName)` pairs
///
/// The binary format registry and the server base URL are injected rather
/// than looked up globally, so resolvers can be built per test or per server.
#[derive(Debug, Clone)]
pub struct DataSourceResolver {
    registry: FormatRegistry,
    remote_base: Url,
    csv: CsvOptions,
}

impl Default for DataSourceResolver {
    fn default() -> Self {
        Self {
            registry: FormatRegistry::default(),
            remote_base: DEFAULT_REMOTE_BASE_URL.clone(),
            csv: CsvOptions::default(),
        }
    }
}

impl DataSourceResolver {
    /// Create a resolver with explicit dependencies
    pub fn new(registry: FormatRegistry, remote_base: Url, csv: CsvOptions) -> Self {
        Self {
            registry,
            remote_base,
            csv,
        }
    }

    /// Create a resolver from a base URL string
    pub fn with_remote_base(remote_base: &str) -> Result<Self> {
        let remote_base = Url::parse(remote_base).map_err(|e| {
            ColchartError::ConfigError(format!("Invalid remote base URL '{}': {}", remote_base, e))
        })?;
        Ok(Self {
            remote_base,
            ..Self::default()
        })
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Classify a data handle
    ///
    /// # Errors
    ///
    /// Returns `ColchartError::UnrecognizedDataEncoding` if a data URL's payload
    /// is not valid base64, or if text cannot be parsed as CSV.
    pub fn resolve(&self, data: &DataHandle) -> Result<(DataSpec, SourceName)> {
        let text = match data {
            DataHandle::Rows(rows) => {
                tracing::debug!(rows = rows.len(), "resolved in-memory rows");
                let rows = rows.iter().cloned().map(Value::Object).collect();
                return Ok((DataSpec::InlineValues { rows }, SourceName::Source0));
            }
            DataHandle::Text(text) => text,
        };

        if naming::is_file_reference(text) {
            let href = self.resolve_file_reference(text)?;
            tracing::debug!(%href, "resolved file reference");
            return Ok((DataSpec::Url { href }, SourceName::Source0));
        }

        if data::is_data_url(text) {
            let bytes = data::decode_data_url(text)?;
            if let Some(decoder) = self.registry.sniff(&bytes) {
                tracing::debug!(format = decoder.name(), len = bytes.len(), "resolved binary data URL");
                return Ok((
                    DataSpec::Binary {
                        format: decoder.name().to_string(),
                        bytes,
                    },
                    SourceName::Data0,
                ));
            }
            let decoded = String::from_utf8(bytes).map_err(|e| {
                ColchartError::UnrecognizedDataEncoding(format!(
                    "Data URL payload is neither a registered binary format nor UTF-8 text: {}",
                    e
                ))
            })?;
            return self.inline_csv(&decoded);
        }

        self.inline_csv(text)
    }

    fn inline_csv(&self, text: &str) -> Result<(DataSpec, SourceName)> {
        let rows = parse_csv_rows(text, &self.csv)?;
        tracing::debug!(rows = rows.len(), "resolved inline CSV");
        let rows = rows.into_iter().map(Value::Object).collect();
        Ok((DataSpec::InlineValues { rows }, SourceName::Data0))
    }

    fn resolve_file_reference(&self, reference: &str) -> Result<String> {
        self.remote_base
            .join(reference)
            .map(|url| url.to_string())
            .map_err(|e| {
                ColchartError::UnrecognizedDataEncoding(format!(
                    "Invalid file reference '{}': {}",
                    reference, e
                ))
            })
    }
}

/// Build a row from `(column, value)` pairs
pub fn row<I, K>(pairs: I) -> Row
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect::<Map<_, _>>()
}
