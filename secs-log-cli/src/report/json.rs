//! JSON report document

use super::LogReport;
use anyhow::{Context, Result};
use secs_log_decoder::{Event, KpiReport, RunSummary};
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    source: String,
    summary: &'a RunSummary,
    kpis: &'a KpiReport,
    events: &'a [Event],
}

pub fn render_json(report: &LogReport<'_>) -> Result<String> {
    let document = JsonReport {
        source: report.source.display().to_string(),
        summary: report.summary,
        kpis: report.kpis,
        events: report.events,
    };
    serde_json::to_string_pretty(&document)
        .with_context(|| format!("Failed to serialize report for {:?}", report.source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secs_log_decoder::{compute_kpis, summarize, Decoder, DecoderConfig, KpiConfig};
    use std::path::Path;

    #[test]
    fn test_render_json_document() {
        let trace = "\
2025/10/03 09:00:00.000000,[Core:Receive],MessageName=S6F11
<L [2]
<U4 [1] 1>
<U4 [1] 181>
>
.
2025/10/03 09:05:00.000000,[Core:Receive],MessageName=S6F11
<L [2]
<U4 [1] 2>
<U4 [1] 132>
>
.
";
        let events = Decoder::loadport().decode_str(trace, &DecoderConfig::new());
        let kpis = compute_kpis(&events, &KpiConfig::default());
        let summary = summarize(&events);
        let report = LogReport {
            source: Path::new("run.txt"),
            events: &events,
            kpis: &kpis,
            summary: &summary,
        };

        let json = render_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["source"], "run.txt");
        assert_eq!(value["summary"]["assessment"], "GoldenRun");
        assert_eq!(value["kpis"]["values"]["Cycle Time"], "300.00s");
        assert_eq!(value["kpis"]["values"]["Average Time Per Unit"], "N/A");
        assert_eq!(value["events"].as_array().unwrap().len(), 2);
    }
}
