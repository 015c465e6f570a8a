//! Report generation
//!
//! Renders one decoded trace as a plain-text walkthrough or a JSON document.

pub mod json;
pub mod txt;

use crate::config::OutputFormat;
use anyhow::Result;
use secs_log_decoder::{Event, KpiReport, RunSummary};
use std::path::{Path, PathBuf};

/// Timestamp layout used in rendered reports (same as the trace headers)
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Everything a report needs about one trace
#[derive(Debug)]
pub struct LogReport<'a> {
    pub source: &'a Path,
    pub events: &'a [Event],
    pub kpis: &'a KpiReport,
    pub summary: &'a RunSummary,
}

/// Render a report in the requested format
pub fn render(report: &LogReport<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Txt => txt::render_txt(report),
        OutputFormat::Json => json::render_json(report),
    }
}

/// `<output_dir>/<stem>_report.<ext>`
pub fn report_path(output_dir: &Path, source: &Path, format: OutputFormat) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trace".to_string());
    output_dir.join(format!("{}_report.{}", stem, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_path() {
        let path = report_path(Path::new("out"), Path::new("logs/AOP101ULD.txt"), OutputFormat::Json);
        assert_eq!(path, Path::new("out").join("AOP101ULD_report.json"));

        let path = report_path(Path::new("out"), Path::new("trace"), OutputFormat::Txt);
        assert_eq!(path, Path::new("out").join("trace_report.txt"));
    }
}
