//! DLT Reader CLI Application
//!
//! Command-line front-end for the dlt-decoder library:
//! - Maps and decodes one or more DLT storage files (in parallel)
//! - Prints every record as a text line or a JSON object
//! - Optional TOML configuration for inputs, output and decoder settings

use anyhow::{bail, Context, Result};
use clap::Parser;
use dlt_decoder::{DecoderConfig, DltFile};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::{AppConfig, OutputFormat};

/// DLT Reader - Decode AUTOSAR DLT log files
#[derive(Parser, Debug)]
#[command(name = "dlt-cli")]
#[command(about = "Decode DLT storage files into readable records", long_about = None)]
#[command(version)]
struct Args {
    /// DLT files to decode (each one is decoded independently)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Sort input files by path before decoding
    #[arg(short, long)]
    sort: bool,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only print the number of records per file
    #[arg(long)]
    count: bool,

    /// Number of files decoded in parallel (default: one per core)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Output of one decoded file, rendered on a worker thread
struct FileReport {
    records: usize,
    rendered: Vec<u8>,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("DLT Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", dlt_decoder::VERSION);

    let config = resolve_config(&args)?;
    if config.input.files.is_empty() {
        // No input - show help
        println!("DLT Reader - No input specified");
        println!("\nQuick Start:");
        println!("  dlt-cli trace.dlt");
        println!("  dlt-cli --format json -o records.jsonl a.dlt b.dlt");
        println!("  dlt-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    }

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let format = config.output.format;
    let results: Vec<Result<FileReport>> = config
        .input
        .files
        .par_iter()
        .map(|path| decode_file(path, &config.decoder, format, args.count))
        .collect();

    let mut out = open_output(config.output.path.as_deref())?;
    let mut failed = 0;
    for (path, result) in config.input.files.iter().zip(results) {
        match result {
            Ok(decoded) if args.count => {
                writeln!(out, "{}: {}", path.display(), decoded.records)?;
            }
            Ok(decoded) => {
                report::render_header(path, decoded.records, &mut out)?;
                out.write_all(&decoded.rendered)?;
            }
            Err(err) => {
                failed += 1;
                log::error!("{:#}", err);
            }
        }
    }
    out.flush()?;

    if failed > 0 {
        bail!("{} of {} files failed to decode", failed, config.input.files.len());
    }
    Ok(())
}

/// Merge the optional config file with command-line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if !args.files.is_empty() {
        config.input.files = args.files.clone();
    }
    if args.sort {
        config.input.sort = true;
    }
    if config.input.sort {
        config.input.files.sort();
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(path) = &args.output {
        config.output.path = Some(path.clone());
    }
    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Map, decode and render one file
///
/// The record set borrows the file's mapping and arena, so rendering happens
/// here before both are released.
fn decode_file(
    path: &Path,
    decoder_config: &DecoderConfig,
    format: OutputFormat,
    count_only: bool,
) -> Result<FileReport> {
    let mut file = DltFile::open(path, decoder_config.clone())
        .with_context(|| format!("Failed to open DLT file: {:?}", path))?;
    let records = file
        .decode()
        .with_context(|| format!("Failed to decode DLT file: {:?}", path))?;

    let mut rendered = Vec::new();
    if !count_only {
        report::render(&records, format, &mut rendered)
            .with_context(|| format!("Failed to render records of {:?}", path))?;
    }
    Ok(FileReport {
        records: records.len(),
        rendered,
    })
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
