//! Standalone SECS trace decoder tool
//!
//! Decodes a loadport host communication trace with the built-in tables and
//! prints every event, followed by the KPIs and a run summary.
//!
//! Usage:
//!   decode_log <trace.txt> [--limit <count>] [--verbose]
//!
//! Example:
//!   decode_log AOP101ULD.txt --limit 100 --verbose

use secs_log_decoder::{compute_kpis, summarize, Decoder, DecoderConfig, Event, Kpi, KpiConfig};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

fn print_event(event: &Event, verbose: bool) {
    println!(
        "[{}] {:<12} {:<14} {}",
        event.timestamp().format("%H:%M:%S%.3f"),
        event.direction(),
        event.classification(),
        event.description()
    );

    if verbose {
        for (field, value) in event.fields() {
            println!("    {}: {}", field, value);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <trace.txt> [--limit <count>] [--verbose]", args[0]);
        eprintln!("\nExample:");
        eprintln!("  {} AOP101ULD.txt --limit 100", args[0]);
        std::process::exit(1);
    }

    let log_file = PathBuf::from(&args[1]);
    let mut limit: Option<usize> = None;
    let mut verbose = false;

    // Parse arguments
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" => {
                i += 1;
                if i < args.len() {
                    limit = Some(args[i].parse()?);
                }
            }
            "--verbose" | "-v" => verbose = true,
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let bytes = std::fs::read(&log_file)?;
    let decoder = Decoder::loadport();
    let events = decoder.decode_bytes(&bytes, &DecoderConfig::new())?;

    println!("=== {} ===", log_file.display());
    let mut per_message: HashMap<&str, usize> = HashMap::new();
    for (index, event) in events.iter().enumerate() {
        *per_message.entry(event.message_name()).or_insert(0) += 1;
        if limit.map_or(true, |max| index < max) {
            print_event(event, verbose);
        }
    }

    let kpis = compute_kpis(&events, &KpiConfig::default());
    println!("\n=== KPIs ===");
    for kpi in [Kpi::CycleTime, Kpi::AverageTimePerUnit, Kpi::MappingTime] {
        println!("{}: {}", kpi, kpis.get(kpi));
    }
    println!("Valid cycles: {} ({} units)", kpis.cycles.len(), kpis.total_units);

    let summary = summarize(&events);
    println!("\n=== DECODING SUMMARY ===");
    println!("Events: {}", summary.total_events);
    println!("Alarms set: {}, cleared: {}", summary.alarms_set, summary.alarms_cleared);
    println!("Assessment: {}", summary.assessment);

    if !per_message.is_empty() {
        println!("\nTop 10 Most Frequent Messages:");
        let mut sorted: Vec<_> = per_message.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (name, count) in sorted.iter().take(10) {
            println!("  {}: {} times", name, count);
        }
    }

    Ok(())
}
