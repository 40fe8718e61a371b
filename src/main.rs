//! card-statement - extract card purchases from a statement converted to HTML
//!
//! Usage:
//!   card-statement fatura.html                     Write output.csv
//!   card-statement fatura.html -o jan.tsv -f tsv   Tab-separated output

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use card_statement_rs::{ExtractorBuilder, OutputFormat, RecordWriter};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Extract itemized purchases, with the card they were made on, from a
/// credit card statement converted to HTML (e.g. with pdftohtml)
#[derive(Parser)]
#[command(name = "card-statement")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Statement markup to read
    input: PathBuf,

    /// Where to write the extracted purchases
    #[arg(short, long, default_value = "output.csv")]
    output: PathBuf,

    /// Output format [default: from the output extension, else csv]
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Tsv,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => OutputFormat::Csv,
            Format::Tsv => OutputFormat::Tsv,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let input = cli.input.to_string_lossy();
    let statement = ExtractorBuilder::new()
        .filename(&input)
        .parse()
        .with_context(|| format!("Failed to parse statement {}", cli.input.display()))?;

    // Only touch the output once the input is known to be usable.
    let file = File::create(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;

    let format = cli
        .format
        .map(OutputFormat::from)
        .or_else(|| OutputFormat::from_extension(&cli.output.to_string_lossy()))
        .unwrap_or_default();

    let mut records = statement.records();
    let mut writer = RecordWriter::new(BufWriter::new(file), format);
    let written = writer
        .write_records(&mut records)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    tracing::info!(
        records = written,
        dropped = records.dropped(),
        output = %cli.output.display(),
        "Extracted purchases"
    );

    Ok(())
}
