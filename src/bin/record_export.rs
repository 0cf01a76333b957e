//! record-export: Export extracted records as CSV, JSON and a PDF table
//!
//! Usage:
//!   # Write all three exports to the current directory
//!   record-export results.json
//!
//!   # Read a scrape response from stdin, CSV only, into ./out
//!   curl -s .../api/scrape | record-export --format csv -o out
//!
//!   # Print a quick preview without exporting
//!   record-export --preview --format none results.json

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use record_export::{load_records, render_preview, ExportConfig, ExportDispatcher, ExportFormat, FileSink};
use std::fs;
use std::io::{stdin, Read};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
    Pdf,
    All,
    None,
}

impl FormatArg {
    fn formats(self) -> Vec<ExportFormat> {
        match self {
            FormatArg::Csv => vec![ExportFormat::Csv],
            FormatArg::Json => vec![ExportFormat::Json],
            FormatArg::Pdf => vec![ExportFormat::Pdf],
            FormatArg::All => ExportFormat::ALL.to_vec(),
            FormatArg::None => vec![],
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "record-export")]
#[command(about = "Export extracted records as CSV, JSON and a PDF table", long_about = None)]
struct Args {
    /// Input file: a JSON array of records or a scrape response (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Which exports to write
    #[arg(long, short = 'f', value_enum, default_value_t = FormatArg::All)]
    format: FormatArg,

    /// Directory the fixed-name export files are written to
    #[arg(long, short = 'o', default_value = ".")]
    output_dir: String,

    /// Title line of the PDF report
    #[arg(long)]
    title: Option<String>,

    /// Print a text preview of the records to stdout
    #[arg(long)]
    preview: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let input = match &args.input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?,
        None => {
            let mut buf = String::new();
            stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
            buf
        }
    };
    let records = load_records(&input).context("Failed to parse records")?;
    log::info!("loaded {} records", records.len());

    if args.preview {
        print!("{}", render_preview(&records));
    }

    let mut config = ExportConfig::default();
    if let Some(title) = args.title {
        config.title = title;
    }

    let sink = FileSink::new(&args.output_dir)
        .with_context(|| format!("Failed to prepare output directory {}", args.output_dir))?;
    let mut dispatcher = ExportDispatcher::new(sink, config);

    for format in args.format.formats() {
        let exported = dispatcher
            .export(format, &records)
            .with_context(|| format!("Failed to export {}", format.file_name()))?;
        if !exported {
            log::warn!("skipped {}: no records", format.file_name());
        }
    }

    Ok(())
}
