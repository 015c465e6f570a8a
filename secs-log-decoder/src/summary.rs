//! Run summary derived from a decoded event list

use crate::kpi::seconds_between;
use crate::tables::AlarmState;
use crate::types::{Event, Field, Timestamp};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Overall verdict for one trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Assessment {
    /// At least one alarm was set
    Fault,
    /// No alarm was set
    GoldenRun,
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assessment::Fault => f.write_str("Equipment FAULT"),
            Assessment::GoldenRun => f.write_str("Golden Run"),
        }
    }
}

/// Counts and identities seen over a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_events: usize,
    /// Event count per classification kind (`event`, `alarm`, ...)
    pub by_classification: BTreeMap<String, usize>,
    pub alarms_set: usize,
    pub alarms_cleared: usize,
    /// Unique ids in first-seen order
    pub operators: Vec<String>,
    pub magazines: Vec<String>,
    pub lots: Vec<String>,
    pub first_timestamp: Option<Timestamp>,
    pub last_timestamp: Option<Timestamp>,
    /// Seconds between the first and last event
    pub span_seconds: Option<f64>,
    pub assessment: Assessment,
}

impl RunSummary {
    pub fn has_alarms(&self) -> bool {
        self.alarms_set > 0
    }
}

fn push_unique(list: &mut Vec<String>, value: Option<&str>) {
    if let Some(value) = value {
        if !list.iter().any(|seen| seen == value) {
            list.push(value.to_string());
        }
    }
}

/// Summarize a log-ordered event list
pub fn summarize(events: &[Event]) -> RunSummary {
    let mut by_classification = BTreeMap::new();
    let mut alarms_set = 0;
    let mut alarms_cleared = 0;
    let mut operators = Vec::new();
    let mut magazines = Vec::new();
    let mut lots = Vec::new();
    let lot_param = Field::Parameter("LOTID".to_string());

    for event in events {
        *by_classification
            .entry(event.classification().kind().to_string())
            .or_insert(0) += 1;

        match event.field(&Field::AlarmState).and_then(AlarmState::from_category) {
            Some(AlarmState::Set) => alarms_set += 1,
            Some(AlarmState::Clear) => alarms_cleared += 1,
            None => {}
        }

        push_unique(&mut operators, event.field(&Field::OperatorId));
        push_unique(&mut magazines, event.field(&Field::MagazineId));
        push_unique(&mut lots, event.field(&Field::LotId).or_else(|| event.field(&lot_param)));
    }

    let first_timestamp = events.iter().map(Event::timestamp).min();
    let last_timestamp = events.iter().map(Event::timestamp).max();
    let span_seconds = match (first_timestamp, last_timestamp) {
        (Some(first), Some(last)) => Some(seconds_between(first, last)),
        _ => None,
    };

    let assessment = if alarms_set > 0 {
        Assessment::Fault
    } else {
        Assessment::GoldenRun
    };

    RunSummary {
        total_events: events.len(),
        by_classification,
        alarms_set,
        alarms_cleared,
        operators,
        magazines,
        lots,
        first_timestamp,
        last_timestamp,
        span_seconds,
        assessment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Classification, Direction, FieldMap, HeaderRecord};
    use chrono::NaiveDate;

    fn event(second: u32, classification: Classification, pairs: &[(Field, &str)]) -> Event {
        let header = HeaderRecord {
            timestamp: NaiveDate::from_ymd_opt(2025, 10, 3)
                .unwrap()
                .and_hms_opt(9, 0, second)
                .unwrap(),
            direction: Direction::Inbound,
            message_name: None,
            line: second as usize,
        };
        let fields: FieldMap = pairs
            .iter()
            .map(|(field, value)| (field.clone(), value.to_string()))
            .collect();
        Event::new(header, classification, fields, String::new())
    }

    #[test]
    fn test_empty_run() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_events, 0);
        assert_eq!(summary.span_seconds, None);
        assert_eq!(summary.assessment, Assessment::GoldenRun);
    }

    #[test]
    fn test_alarm_set_means_fault() {
        let events = vec![
            event(0, Classification::Alarm(102), &[(Field::AlarmState, "AlarmSet")]),
            event(5, Classification::Alarm(101), &[(Field::AlarmState, "AlarmClear")]),
        ];
        let summary = summarize(&events);
        assert_eq!(summary.alarms_set, 1);
        assert_eq!(summary.alarms_cleared, 1);
        assert!(summary.has_alarms());
        assert_eq!(summary.assessment, Assessment::Fault);
        assert_eq!(summary.assessment.to_string(), "Equipment FAULT");
    }

    #[test]
    fn test_cleared_only_is_golden_run() {
        let events = vec![event(0, Classification::Alarm(101), &[(Field::AlarmState, "AlarmClear")])];
        assert_eq!(summarize(&events).assessment, Assessment::GoldenRun);
    }

    #[test]
    fn test_unique_ids_in_first_seen_order() {
        let events = vec![
            event(0, Classification::EventCode(181), &[(Field::OperatorId, "OP2"), (Field::MagazineId, "MAG-9")]),
            event(1, Classification::EventCode(181), &[(Field::OperatorId, "OP1"), (Field::MagazineId, "MAG-9")]),
            event(2, Classification::EventCode(181), &[(Field::OperatorId, "OP2")]),
            event(3, Classification::Command("LOADSTART".to_string()), &[(Field::Parameter("LOTID".to_string()), "LOT-A")]),
            event(4, Classification::EventCode(120), &[(Field::LotId, "LOT-B")]),
        ];
        let summary = summarize(&events);
        assert_eq!(summary.operators, vec!["OP2", "OP1"]);
        assert_eq!(summary.magazines, vec!["MAG-9"]);
        assert_eq!(summary.lots, vec!["LOT-A", "LOT-B"]);
        assert_eq!(summary.span_seconds, Some(4.0));
    }

    #[test]
    fn test_counts_by_classification() {
        let events = vec![
            event(0, Classification::EventCode(141), &[]),
            event(1, Classification::EventCode(136), &[]),
            event(2, Classification::Unclassified, &[]),
        ];
        let summary = summarize(&events);
        assert_eq!(summary.by_classification.get("event"), Some(&2));
        assert_eq!(summary.by_classification.get("unclassified"), Some(&1));
        assert_eq!(summary.by_classification.get("alarm"), None);
    }
}
