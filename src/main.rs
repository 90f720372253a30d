use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use columnar_prep::{
    Pipeline, ShapingConfig,
    processor::export::{write_summaries, write_table},
};
use jemallocator::Jemalloc;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
}

/// Load a delimited table, normalize category labels and print grouped summaries.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Pipeline description (TOML).
    config: PathBuf,

    /// Read this file instead of `source.path` from the config.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print the shaped table instead of the summaries.
    #[arg(long)]
    table: bool,

    /// Log filter (overrides `RUST_LOG`), e.g. `debug` or `columnar_prep=trace`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref())?;

    let config = ShapingConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let shaped = match &args.input {
        Some(input) => Pipeline::run_with_source(&config, input),
        None => Pipeline::run(&config),
    }
    .context("pipeline failed")?;

    let delimiter = match args.format {
        OutputFormat::Text => b'\t',
        OutputFormat::Csv => b',',
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &config.aggregate {
        Some(agg) if !args.table => write_summaries(
            &mut out,
            &agg.group_by,
            &agg.stats,
            &shaped.summaries,
            delimiter,
        )?,
        _ => write_table(&shaped.table, &mut out, delimiter)?,
    }

    out.flush()?;
    Ok(())
}

fn init_tracing(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(f) => EnvFilter::try_new(f).with_context(|| format!("invalid log filter '{f}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}
