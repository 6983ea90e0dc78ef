/*!
colchart Command Line Interface

Summarizes CSV / Arrow IPC files into column header charts, augments Vega-Lite
specs with selections, and builds kernel session URLs.
*/

use anyhow::{bail, Context};
use base64::Engine;
use clap::{Parser, Subcommand};
use colchart::reader::data::parse_csv;
use colchart::selection::{
    make_selectable, selection_param_names, ChartSelection, FieldSelection, SelectionOptions,
};
use colchart::summary::TableSummary;
use colchart::writer::VegaLiteWriter;
use colchart::{ColumnChartSpecModel, Config, DataFrame, DataHandle, VERSION};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "colchart")]
#[command(about = "Column header charts for tabular data")]
#[command(version = VERSION)]
pub struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print header summaries of every column (or one) as JSON
    Summary {
        /// CSV or Arrow IPC file
        file: PathBuf,

        /// Only summarize this column
        #[arg(long)]
        column: Option<String>,

        /// Omit chart specs
        #[arg(long)]
        no_charts: bool,

        /// Chart numeric columns from the computed bins
        #[arg(long)]
        precomputed: bool,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print the Vega-Lite spec of one column
    Spec {
        /// CSV or Arrow IPC file
        file: PathBuf,

        column: String,

        /// Include the `$schema` URL for standalone rendering
        #[arg(long)]
        schema: bool,
    },

    /// Print the WebSocket URL of a kernel session
    WsUrl {
        /// Server base URL
        base: String,

        session_id: String,

        /// Page query string to carry over
        #[arg(long, default_value = "")]
        query: String,
    },

    /// Add selection params to a Vega-Lite spec
    Select {
        /// Vega-Lite JSON file
        file: PathBuf,

        /// Skip point/interval selections
        #[arg(long)]
        no_chart_selection: bool,

        /// Legend fields to make selectable
        #[arg(long, value_delimiter = ',', conflicts_with = "no_fields")]
        fields: Option<Vec<String>>,

        /// Skip legend selections
        #[arg(long)]
        no_fields: bool,

        /// Print only the selection param names
        #[arg(long)]
        names: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A loaded table plus the handle the chart model reads its rows from
struct LoadedTable {
    df: DataFrame,
    handle: DataHandle,
}

fn load_table(path: &Path, config: &Config) -> anyhow::Result<LoadedTable> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let resolver = config.resolver()?;

    if let Some(decoder) = resolver.registry().sniff(&bytes) {
        tracing::debug!(format = decoder.name(), path = %path.display(), "loading binary table");
        let df = decoder.decode(&bytes)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let handle = DataHandle::Text(format!("data:application/octet-stream;base64,{}", encoded));
        return Ok(LoadedTable { df, handle });
    }

    let text = String::from_utf8(bytes)
        .with_context(|| format!("{} is neither a known binary format nor UTF-8", path.display()))?;
    tracing::debug!(path = %path.display(), "loading CSV table");
    let df = parse_csv(&text, &config.csv)?;
    Ok(LoadedTable {
        df,
        handle: DataHandle::Text(text),
    })
}

fn build_model(
    path: &Path,
    config: &Config,
    include_charts: bool,
    precomputed: bool,
) -> anyhow::Result<(ColumnChartSpecModel, Vec<String>)> {
    let table = load_table(path, config)?;
    let columns = table
        .df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    let mut options = config.chart_options;
    options.include_charts = include_charts;
    options.use_pre_computed_values |= precomputed;

    let model = TableSummary::from_dataframe(&table.df, &config.summary)?.into_model(
        table.handle,
        options,
        &config.resolver()?,
    )?;
    Ok((model, columns))
}

fn to_json(value: &Value, pretty: bool) -> anyhow::Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Summary {
            file,
            column,
            no_charts,
            precomputed,
            pretty,
        } => {
            let (model, columns) = build_model(&file, &config, !no_charts, precomputed)?;

            let selected: Vec<String> = match column {
                Some(column) => {
                    if !columns.contains(&column) {
                        bail!("Column '{}' not found in {}", column, file.display());
                    }
                    vec![column]
                }
                None => columns,
            };

            let mut out = Map::new();
            for column in selected {
                let summary = model.get_header_summary(&column)?;
                out.insert(column, serde_json::to_value(summary)?);
            }
            println!("{}", to_json(&Value::Object(out), pretty)?);
        }

        Commands::Spec {
            file,
            column,
            schema,
        } => {
            let (model, _) = build_model(&file, &config, true, false)?;
            let writer = if schema {
                VegaLiteWriter::new().with_schema()
            } else {
                VegaLiteWriter::new()
            };
            match model.with_writer(writer).build_spec(&column)? {
                Some(spec) => println!("{}", to_json(&spec, true)?),
                None => eprintln!("Column '{}' has no chart", column),
            }
        }

        Commands::WsUrl {
            base,
            session_id,
            query,
        } => {
            let base = Url::parse(&base).with_context(|| format!("Invalid base URL '{}'", base))?;
            println!("{}", colchart::session::ws_url(&base, &query, &session_id)?);
        }

        Commands::Select {
            file,
            no_chart_selection,
            fields,
            no_fields,
            names,
        } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let spec: Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;

            let options = SelectionOptions {
                chart_selection: if no_chart_selection {
                    ChartSelection::Disabled
                } else {
                    ChartSelection::All
                },
                field_selection: match (no_fields, fields) {
                    (true, _) => FieldSelection::Disabled,
                    (false, Some(fields)) => FieldSelection::Fields(fields),
                    (false, None) => FieldSelection::All,
                },
            };

            let selectable = make_selectable(&spec, &options);
            if names {
                for name in selection_param_names(&selectable) {
                    println!("{}", name);
                }
            } else {
                println!("{}", to_json(&selectable, true)?);
            }
        }
    }

    Ok(())
}
