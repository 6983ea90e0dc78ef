//! Decoding of inline data: data URLs, CSV text, and DataFrame-to-rows conversion.

use crate::{ColchartError, DataFrame, Result};
use base64::Engine;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::io::Cursor;

/// One row of inline data, keyed by column name
pub type Row = Map<String, Value>;

const DATA_URL_SCHEME: &str = "data:";

/// CSV parsing options for inline text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field separator byte, written as a one-character string in config files
    #[serde(with = "separator_char")]
    pub separator: u8,
    /// Rows used for schema inference; `None` scans everything
    pub infer_schema_length: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            infer_schema_length: Some(100),
        }
    }
}

mod separator_char {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(separator: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&(*separator as char).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_bytes() {
            [byte] => Ok(*byte),
            _ => Err(de::Error::custom(format!(
                "separator must be a single ASCII character, got '{}'",
                s
            ))),
        }
    }
}

/// Check whether a string is a `data:` URL
pub fn is_data_url(data: &str) -> bool {
    data.starts_with(DATA_URL_SCHEME)
}

/// Decode the base64 payload of a data URL (everything after the first comma)
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let (_, payload) = data_url.split_once(',').ok_or_else(|| {
        ColchartError::UnrecognizedDataEncoding("Data URL has no payload separator".to_string())
    })?;

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| {
            ColchartError::UnrecognizedDataEncoding(format!("Invalid base64 in data URL: {}", e))
        })
}

/// Parse CSV text into a DataFrame with inferred column types, dates included
pub fn parse_csv(text: &str, options: &CsvOptions) -> Result<DataFrame> {
    let read_options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .map_parse_options(|opts| {
            opts.with_separator(options.separator)
                .with_try_parse_dates(true)
        });

    CsvReader::new(Cursor::new(text.as_bytes().to_vec()))
        .with_options(read_options)
        .finish()
        .map_err(|e| ColchartError::UnrecognizedDataEncoding(format!("Failed to parse CSV: {}", e)))
}

/// Parse CSV text into JSON rows. Blank text yields no rows.
pub fn parse_csv_rows(text: &str, options: &CsvOptions) -> Result<Vec<Row>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let df = parse_csv(text, options)?;
    dataframe_to_values(&df)
}

/// Convert a DataFrame to row objects
pub fn dataframe_to_values(df: &DataFrame) -> Result<Vec<Row>> {
    let height = df.height();
    let column_names = df.get_column_names();
    let mut values = Vec::with_capacity(height);

    for row_idx in 0..height {
        let mut row_obj = Map::new();

        for (col_idx, col_name) in column_names.iter().enumerate() {
            let column = df.get_columns().get(col_idx).ok_or_else(|| {
                ColchartError::InternalError(format!("Failed to get column {}", col_name))
            })?;

            let value = series_value_at(column.as_materialized_series(), row_idx)?;
            row_obj.insert(col_name.to_string(), value);
        }

        values.push(row_obj);
    }

    Ok(values)
}

fn cast_error(kind: &str, e: PolarsError) -> ColchartError {
    ColchartError::ReaderError(format!("Failed to cast to {}: {}", kind, e))
}

/// Get a single value from a series as JSON; temporal values become ISO strings
fn series_value_at(series: &Series, idx: usize) -> Result<Value> {
    use DataType::*;

    let value = match series.dtype() {
        Int8 => series.i8().map_err(|e| cast_error("i8", e))?.get(idx).map(|v| json!(v)),
        Int16 => series.i16().map_err(|e| cast_error("i16", e))?.get(idx).map(|v| json!(v)),
        Int32 => series.i32().map_err(|e| cast_error("i32", e))?.get(idx).map(|v| json!(v)),
        Int64 => series.i64().map_err(|e| cast_error("i64", e))?.get(idx).map(|v| json!(v)),
        UInt8 => series.u8().map_err(|e| cast_error("u8", e))?.get(idx).map(|v| json!(v)),
        UInt16 => series.u16().map_err(|e| cast_error("u16", e))?.get(idx).map(|v| json!(v)),
        UInt32 => series.u32().map_err(|e| cast_error("u32", e))?.get(idx).map(|v| json!(v)),
        UInt64 => series.u64().map_err(|e| cast_error("u64", e))?.get(idx).map(|v| json!(v)),
        // NaN/inf have no JSON form and land as null
        Float32 => series.f32().map_err(|e| cast_error("f32", e))?.get(idx).map(|v| json!(v)),
        Float64 => series.f64().map_err(|e| cast_error("f64", e))?.get(idx).map(|v| json!(v)),
        Boolean => series.bool().map_err(|e| cast_error("bool", e))?.get(idx).map(|v| json!(v)),
        String => series.str().map_err(|e| cast_error("string", e))?.get(idx).map(|v| json!(v)),
        Date => {
            // Days since epoch -> "YYYY-MM-DD"
            let ca = series.date().map_err(|e| cast_error("date", e))?;
            ca.phys.get(idx).and_then(|days| {
                chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
                    .map(|epoch| epoch + chrono::Duration::days(days as i64))
                    .map(|date| json!(date.format("%Y-%m-%d").to_string()))
            })
        }
        Datetime(time_unit, _) => {
            // Timestamp -> "YYYY-MM-DDTHH:MM:SS.sssZ"
            let ca = series.datetime().map_err(|e| cast_error("datetime", e))?;
            ca.phys.get(idx).and_then(|timestamp| {
                let micros = match time_unit {
                    TimeUnit::Microseconds => timestamp,
                    TimeUnit::Milliseconds => timestamp * 1_000,
                    TimeUnit::Nanoseconds => timestamp / 1_000,
                };
                chrono::DateTime::<chrono::Utc>::from_timestamp_micros(micros)
                    .map(|dt| json!(dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()))
            })
        }
        Time => {
            // Nanoseconds since midnight -> "HH:MM:SS.sss"
            let ca = series.time().map_err(|e| cast_error("time", e))?;
            ca.phys.get(idx).map(|nanos| {
                let hours = nanos / 3_600_000_000_000;
                let minutes = (nanos % 3_600_000_000_000) / 60_000_000_000;
                let seconds = (nanos % 60_000_000_000) / 1_000_000_000;
                let millis = (nanos % 1_000_000_000) / 1_000_000;
                json!(format!(
                    "{:02}:{:02}:{:02}.{:03}",
                    hours, minutes, seconds, millis
                ))
            })
        }
        Null => None,
        _ => series
            .get(idx)
            .ok()
            .filter(|v| !v.is_null())
            .map(|v| json!(v.to_string())),
    };

    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_url() {
        // "a,b\n1,2"
        let bytes = decode_data_url("data:text/csv;base64,YSxiCjEsMg==").unwrap();
        assert_eq!(bytes, b"a,b\n1,2");
    }

    #[test]
    fn test_decode_data_url_without_comma() {
        let err = decode_data_url("data:text/csv;base64").unwrap_err();
        assert!(matches!(err, ColchartError::UnrecognizedDataEncoding(_)));
    }

    #[test]
    fn test_is_data_url() {
        assert!(is_data_url("data:text/csv;base64,AAAA"));
        assert!(!is_data_url("a,b\n1,2"));
        assert!(!is_data_url("./@file/data.csv"));
    }

    #[test]
    fn test_parse_csv_rows_infers_types() {
        let rows = parse_csv_rows(
            "int,float,flag,name\n1,1.5,true,a\n2,,false,b",
            &CsvOptions::default(),
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["int"], json!(1));
        assert_eq!(rows[0]["float"], json!(1.5));
        assert_eq!(rows[0]["flag"], json!(true));
        assert_eq!(rows[0]["name"], json!("a"));
        assert_eq!(rows[1]["float"], Value::Null);
    }

    #[test]
    fn test_parse_csv_rows_custom_separator() {
        let options = CsvOptions {
            separator: b';',
            ..Default::default()
        };
        let rows = parse_csv_rows("a;b\n1;2", &options).unwrap();
        assert_eq!(rows[0]["b"], json!(2));
    }

    #[test]
    fn test_parse_csv_infers_dates() {
        let df = parse_csv("d,ts\n2024-01-01,2024-01-01 12:30:00", &CsvOptions::default()).unwrap();
        assert_eq!(df.column("d").unwrap().dtype(), &DataType::Date);
        assert!(matches!(
            df.column("ts").unwrap().dtype(),
            DataType::Datetime(_, _)
        ));

        let rows = parse_csv_rows("d\n2024-01-01", &CsvOptions::default()).unwrap();
        assert_eq!(rows[0]["d"], json!("2024-01-01"));

        let rows = parse_csv_rows("ts\n2024-01-01 12:30:00", &CsvOptions::default()).unwrap();
        assert_eq!(rows[0]["ts"], json!("2024-01-01T12:30:00.000Z"));
    }

    #[test]
    fn test_parse_csv_rows_blank() {
        assert!(parse_csv_rows("", &CsvOptions::default()).unwrap().is_empty());
        assert!(parse_csv_rows("  \n", &CsvOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_dataframe_to_values_temporal() {
        let mut df = df! { "d" => &[0i32, 19723] }.unwrap();
        let casted = df.column("d").unwrap().cast(&DataType::Date).unwrap();
        df.with_column(casted).unwrap();

        let rows = dataframe_to_values(&df).unwrap();
        assert_eq!(rows[0]["d"], json!("1970-01-01"));
        assert_eq!(rows[1]["d"], json!("2024-01-01"));
    }
}
