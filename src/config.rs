//! JSON configuration for the resolver, summarizer and chart options.

use crate::reader::{CsvOptions, DataSourceResolver, FormatRegistry, DEFAULT_REMOTE_BASE};
use crate::summary::SummaryOptions;
use crate::types::ChartOptions;
use crate::{ColchartError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Runtime configuration; every field is optional in the JSON form
///
/// ```json
/// {
///   "remote_base_url": "https://notebooks.example.com/",
///   "chart_options": { "includeCharts": true },
///   "summary": { "bin_count": 20 },
///   "csv": { "separator": ";" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL that `./@file` references are resolved against
    pub remote_base_url: String,
    pub chart_options: ChartOptions,
    pub summary: SummaryOptions,
    pub csv: CsvOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_base_url: DEFAULT_REMOTE_BASE.to_string(),
            chart_options: ChartOptions::default(),
            summary: SummaryOptions::default(),
            csv: CsvOptions::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ColchartError::ConfigError(format!("Invalid config: {}", e)))
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ColchartError::ConfigError(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Self::from_json_str(&text)
    }

    /// Resolver using the configured base URL and CSV options
    pub fn resolver(&self) -> Result<DataSourceResolver> {
        let remote_base = Url::parse(&self.remote_base_url).map_err(|e| {
            ColchartError::ConfigError(format!(
                "Invalid remote base URL '{}': {}",
                self.remote_base_url, e
            ))
        })?;
        Ok(DataSourceResolver::new(
            FormatRegistry::default(),
            remote_base,
            self.csv.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{DataHandle, DataSpec};
    use std::io::Write;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(Config::from_json_str("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_json_str(
            r#"{
                "remote_base_url": "https://example.com/app/",
                "chart_options": {"includeCharts": true},
                "summary": {"bin_count": 20},
                "csv": {"separator": ";"}
            }"#,
        )
        .unwrap();

        assert!(config.chart_options.include_charts);
        assert!(!config.chart_options.use_pre_computed_values);
        assert_eq!(config.summary.bin_count, 20);
        assert_eq!(config.csv.separator, b';');
        assert_eq!(config.csv.infer_schema_length, Some(100));
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::from_json_str(r#"{"csv": {"separator": ";;"}}"#).unwrap_err();
        assert!(matches!(err, ColchartError::ConfigError(_)));

        let err = Config::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ColchartError::ConfigError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"remote_base_url": "https://example.com/nb/"}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        let resolver = config.resolver().unwrap();
        let (spec, _) = resolver
            .resolve(&DataHandle::Text("./@file/x.csv".into()))
            .unwrap();
        assert_eq!(
            spec,
            DataSpec::Url {
                href: "https://example.com/nb/@file/x.csv".to_string()
            }
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ColchartError::ConfigError(_)));
    }

    #[test]
    fn test_bad_remote_base() {
        let config = Config {
            remote_base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.resolver(), Err(ColchartError::ConfigError(_))));
    }
}
