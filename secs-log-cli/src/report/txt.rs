//! Plain-text report: summary, KPIs, then the chronological walkthrough

use super::{LogReport, TIMESTAMP_FORMAT};
use secs_log_decoder::{Kpi, NOT_AVAILABLE};
use anyhow::{Context, Result};
use std::fmt::{self, Write};

const RULE: &str = "================================================================================";
const THIN_RULE: &str = "--------------------------------------------------------------------------------";

fn list_or_na(items: &[String]) -> String {
    if items.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        items.join(", ")
    }
}

pub fn render_txt(report: &LogReport<'_>) -> Result<String> {
    let mut out = String::new();
    write_report(&mut out, report).context("Failed to render text report")?;
    Ok(out)
}

/// Write the report sections to any formatter sink
pub fn write_report<W: Write>(out: &mut W, report: &LogReport<'_>) -> fmt::Result {
    let summary = report.summary;

    writeln!(out, "SECS/GEM LOADPORT OPERATION REPORT")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Source: {}", report.source.display())?;
    writeln!(out, "Assessment: {}", summary.assessment)?;
    writeln!(out)?;

    writeln!(out, "SUMMARY")?;
    writeln!(out, "{}", THIN_RULE)?;
    writeln!(out, "  Events:      {}", summary.total_events)?;
    for (kind, count) in &summary.by_classification {
        writeln!(out, "    {:<12} {}", kind, count)?;
    }
    match (summary.first_timestamp, summary.last_timestamp, summary.span_seconds) {
        (Some(first), Some(last), Some(span)) => writeln!(
            out,
            "  Time span:   {} .. {} ({:.2}s)",
            first.format(TIMESTAMP_FORMAT),
            last.format(TIMESTAMP_FORMAT),
            span
        )?,
        _ => writeln!(out, "  Time span:   {}", NOT_AVAILABLE)?,
    }
    writeln!(
        out,
        "  Alarms:      {} set, {} cleared",
        summary.alarms_set, summary.alarms_cleared
    )?;
    writeln!(out, "  Operators:   {}", list_or_na(&summary.operators))?;
    writeln!(out, "  Magazines:   {}", list_or_na(&summary.magazines))?;
    writeln!(out, "  Lots:        {}", list_or_na(&summary.lots))?;
    writeln!(out)?;

    writeln!(out, "KEY PERFORMANCE INDICATORS")?;
    writeln!(out, "{}", THIN_RULE)?;
    for kpi in [Kpi::CycleTime, Kpi::AverageTimePerUnit, Kpi::MappingTime] {
        writeln!(out, "  {:<24} {}", format!("{}:", kpi), report.kpis.get(kpi))?;
    }
    writeln!(
        out,
        "  {:<24} {} ({} units)",
        "Valid cycles:",
        report.kpis.cycles.len(),
        report.kpis.total_units
    )?;
    writeln!(out)?;

    writeln!(out, "CHRONOLOGICAL WALKTHROUGH")?;
    writeln!(out, "{}", THIN_RULE)?;
    if report.events.is_empty() {
        writeln!(out, "Log file is empty or no valid SECS/GEM events were found.")?;
    }
    for event in report.events {
        writeln!(
            out,
            "[{}] {}",
            event.timestamp().format(TIMESTAMP_FORMAT),
            event.description()
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secs_log_decoder::{compute_kpis, summarize, Decoder, DecoderConfig, KpiConfig};
    use std::path::Path;

    const TRACE: &str = "\
2025/10/03 09:00:00.000000,[Core:Receive],MessageName=S6F11
<L [3]
<U4 [1] 1>
<U4 [1] 141>
<L [2]
<U1 [1] 1>
<A [3] 'MIC'>
>
>
.
";

    #[test]
    fn test_render_txt_sections() {
        let events = Decoder::loadport().decode_str(TRACE, &DecoderConfig::new());
        let kpis = compute_kpis(&events, &KpiConfig::default());
        let summary = summarize(&events);
        let report = LogReport {
            source: Path::new("AOP101ULD.txt"),
            events: &events,
            kpis: &kpis,
            summary: &summary,
        };

        let text = render_txt(&report).unwrap();
        assert!(text.contains("Source: AOP101ULD.txt"));
        assert!(text.contains("Assessment: Golden Run"));
        assert!(text.contains("Cycle Time:"));
        assert!(text.contains("Mapping Time:"));
        assert!(text.contains("Operators:   N/A"));
        assert!(text.contains("[2025/10/03 09:00:00.000] Port 1 status changed to MIC"));
    }

    #[test]
    fn test_render_txt_empty_log() {
        let kpis = compute_kpis(&[], &KpiConfig::default());
        let summary = summarize(&[]);
        let report = LogReport {
            source: Path::new("empty.txt"),
            events: &[],
            kpis: &kpis,
            summary: &summary,
        };
        let text = render_txt(&report).unwrap();
        assert!(text.contains("Time span:   N/A"));
        assert!(text.contains("no valid SECS/GEM events were found"));
    }

    /// Sink that refuses writes once `budget` bytes have been taken
    struct ShortSink {
        budget: usize,
        written: String,
    }

    impl Write for ShortSink {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if self.written.len() + s.len() > self.budget {
                return Err(fmt::Error);
            }
            self.written.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn test_write_report_propagates_sink_errors() {
        let kpis = compute_kpis(&[], &KpiConfig::default());
        let summary = summarize(&[]);
        let report = LogReport {
            source: Path::new("short.txt"),
            events: &[],
            kpis: &kpis,
            summary: &summary,
        };

        let mut sink = ShortSink { budget: 40, written: String::new() };
        assert!(write_report(&mut sink, &report).is_err());
        assert!(sink.written.starts_with("SECS/GEM LOADPORT OPERATION REPORT"));
        assert!(!sink.written.contains("SUMMARY"));

        let mut full = String::new();
        write_report(&mut full, &report).unwrap();
        assert_eq!(full, render_txt(&report).unwrap());
    }
}
