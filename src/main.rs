//! CLI entry point for the trip-data profiler.
//!
//! Provides subcommands for running the ingest/clean/aggregate pipeline over
//! a year of monthly bike-share archives and for listing the default sources.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use tripdata_profiler::{
    analyzers::aggregate::summarize,
    clean::clean,
    fetch::BasicClient,
    ingest::ingest_all,
    output::{Report, print_json, print_pretty, write_report, write_trips},
    sources::{Source, default_sources},
};

#[derive(Parser)]
#[command(name = "tripdata_profiler")]
#[command(about = "Compare member and casual bike-share riders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest, clean and aggregate trip data
    Analyze {
        /// Paths or URLs of monthly .zip, .csv.gz or .csv files (defaults to the built-in year)
        #[arg(value_name = "FILE_OR_URL")]
        sources: Vec<String>,

        /// Directory to write one CSV per aggregate table plus summary.json
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// CSV file to write the cleaned trips to
        #[arg(long)]
        cleaned_csv: Option<PathBuf>,

        /// Log the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the built-in monthly sources
    ListSources,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/tripdata_profiler.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("tripdata_profiler.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            sources,
            output_dir,
            cleaned_csv,
            json,
        } => {
            let sources = if sources.is_empty() {
                default_sources()
            } else {
                sources.iter().map(|s| Source::from_location(s)).collect()
            };

            analyze(&sources, output_dir.as_deref(), cleaned_csv.as_deref(), json).await?;
        }
        Commands::ListSources => {
            let sources = default_sources();
            for source in &sources {
                info!(label = %source.label, location = %source.location, "Source");
            }
            info!(total = sources.len(), "Built-in sources");
        }
    }

    Ok(())
}

/// Runs the pipeline end to end: ingest every source, clean the unified
/// table, aggregate, then emit whatever outputs were requested.
#[tracing::instrument(skip(sources), fields(sources = sources.len()))]
async fn analyze(
    sources: &[Source],
    output_dir: Option<&Path>,
    cleaned_csv: Option<&Path>,
    json: bool,
) -> Result<()> {
    let client = BasicClient::new()?;

    let raw = ingest_all(&client, sources).await?;
    let cleaned = clean(raw);
    let summary = summarize(&cleaned.trips);

    let report = Report {
        cleaning: &cleaned.report,
        summary: &summary,
    };
    print_pretty(&report);

    if json {
        print_json(&report)?;
    }

    if let Some(path) = cleaned_csv {
        write_trips(path, &cleaned.trips)?;
    }

    if let Some(dir) = output_dir {
        write_report(dir, &report)?;
    }

    info!(
        input_rows = cleaned.report.input_rows,
        retained = cleaned.report.retained,
        removed = cleaned.report.removed(),
        "Analysis finished"
    );
    Ok(())
}
