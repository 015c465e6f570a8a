//! SECS Log Reader CLI Application
//!
//! This is the command-line interface for the SECS/GEM loadport trace reader.
//! It uses the secs-log-decoder library and adds:
//! - File and TOML configuration handling
//! - Site reference tables merged over the built-in ones
//! - Parallel decoding of multiple traces
//! - Report generation (TXT/JSON)

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use secs_log_decoder::{compute_kpis, summarize, Decoder, DecoderConfig, KpiConfig, ReferenceTables};
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod report;

use config::OutputFormat;
use report::LogReport;

/// SECS Log Reader - Decode and analyze loadport host communication traces
#[derive(Parser, Debug)]
#[command(name = "secs-log-cli")]
#[command(about = "Decode SECS/GEM loadport traces into events and KPIs", long_about = None)]
#[command(version)]
struct Args {
    /// Path to trace file(s) to decode (can be repeated)
    #[arg(short, long, value_name = "FILE")]
    log: Vec<PathBuf>,

    /// Site reference tables (TOML), merged over the built-in tables
    #[arg(short, long, value_name = "FILE")]
    tables: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Write reports to this directory instead of stdout
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Everything needed to decode and report a batch of traces
struct RunPlan {
    files: Vec<PathBuf>,
    tables: ReferenceTables,
    decoder: DecoderConfig,
    kpi: KpiConfig,
    format: OutputFormat,
    output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("SECS Log Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", secs_log_decoder::VERSION);

    let plan = if !args.log.is_empty() {
        simple_mode_plan(&args)?
    } else if let Some(config_path) = &args.config {
        config_mode_plan(config_path, &args)?
    } else {
        // No arguments - show help
        println!("SECS Log Reader - No input specified");
        println!("\nQuick Start:");
        println!("  secs-log-cli --log AOP101ULD.txt");
        println!("  secs-log-cli --log AOP101ULD.txt --tables site_tables.toml --format json");
        println!("\nFor batch runs:");
        println!("  secs-log-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    };

    run(&plan)
}

/// Simple mode - built-in tables (optionally extended), defaults everywhere else
fn simple_mode_plan(args: &Args) -> Result<RunPlan> {
    let tables = match &args.tables {
        Some(path) => config::load_tables(path)?,
        None => ReferenceTables::loadport(),
    };

    Ok(RunPlan {
        files: args.log.clone(),
        tables,
        decoder: DecoderConfig::new(),
        kpi: KpiConfig::new(),
        format: args.format.unwrap_or_default(),
        output_dir: args.output_dir.clone(),
    })
}

/// Config mode - everything from TOML; command-line flags override output settings
fn config_mode_plan(config_path: &Path, args: &Args) -> Result<RunPlan> {
    log::info!("Loading configuration from: {:?}", config_path);
    let config = config::load_config(config_path)?;
    log::debug!("Configuration loaded successfully");

    let tables_path = args.tables.as_ref().or(config.input.tables.as_ref());
    let tables = match tables_path {
        Some(path) => config::load_tables(path)?,
        None => ReferenceTables::loadport(),
    };

    Ok(RunPlan {
        files: config.input.files,
        tables,
        decoder: config.decoder,
        kpi: config.kpi,
        format: args.format.unwrap_or(config.output.format),
        output_dir: args.output_dir.clone().or(config.output.output_dir),
    })
}

/// Decode every file in parallel, then emit reports in input order
fn run(plan: &RunPlan) -> Result<()> {
    plan.decoder.validate().context("Invalid decoder configuration")?;

    for command in plan.tables.unmatchable_commands() {
        log::warn!(
            "Command {:?} can never be recognised (tokens must be 5+ uppercase letters)",
            command
        );
    }

    let stats = plan.tables.stats();
    log::info!(
        "Reference tables: {} event codes ({} alarm classes), {} commands, {} alarms, {} status variables",
        stats.num_event_codes,
        stats.num_alarm_codes,
        stats.num_commands,
        stats.num_alarms,
        stats.num_status_variables
    );

    let decoder = Decoder::new(plan.tables.clone());

    let rendered: Vec<Result<String>> = plan
        .files
        .par_iter()
        .map(|path| process_file(path, &decoder, plan))
        .collect();

    if let Some(dir) = &plan.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    }

    let mut failures = 0;
    for (path, result) in plan.files.iter().zip(rendered) {
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                log::error!("{:#}", e);
                failures += 1;
                continue;
            }
        };

        match &plan.output_dir {
            Some(dir) => {
                let out_path = report::report_path(dir, path, plan.format);
                fs::write(&out_path, text)
                    .with_context(|| format!("Failed to write report: {:?}", out_path))?;
                log::info!("Wrote {:?}", out_path);
            }
            None => println!("{}", text),
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files failed", failures, plan.files.len());
    }
    Ok(())
}

/// Read, decode and render one trace
fn process_file(path: &Path, decoder: &Decoder, plan: &RunPlan) -> Result<String> {
    log::info!("Decoding log file: {:?}", path);

    let bytes = fs::read(path).with_context(|| format!("Failed to read log file: {:?}", path))?;
    let events = decoder
        .decode_bytes(&bytes, &plan.decoder)
        .with_context(|| format!("Failed to decode log file: {:?}", path))?;

    let kpis = compute_kpis(&events, &plan.kpi);
    let summary = summarize(&events);
    log::debug!("{:?}: {} events, {}", path, events.len(), summary.assessment);

    let report = LogReport {
        source: path,
        events: &events,
        kpis: &kpis,
        summary: &summary,
    };
    report::render(&report, plan.format)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

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
