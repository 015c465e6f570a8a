//! Temporal KPI correlation
//!
//! Pairs cycle start and end events, attributes transferred units to each
//! valid cycle, and measures the mapping interval. Missing boundaries and
//! zero denominators produce [`KpiValue::NotAvailable`], never an error.
//!
//! ## Cycle pairing rules
//!
//! - each start pairs with the earliest end strictly after it
//! - the pair is discarded if another start lies strictly between the two,
//!   or shares its timestamp (tied starts form one cycle)
//! - the pair is discarded unless its duration is positive
//! - units are counted in `[start, end]`, inclusive on both sides

use crate::config::KpiConfig;
use crate::types::{Event, Field, Timestamp, NOT_AVAILABLE};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Named metrics produced by the correlator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kpi {
    /// Mean duration of valid cycles
    CycleTime,
    /// Total valid cycle time divided by total attributed units
    AverageTimePerUnit,
    /// First mapping-start port state to last mapping completion
    MappingTime,
}

impl Kpi {
    pub fn name(self) -> &'static str {
        match self {
            Kpi::CycleTime => "Cycle Time",
            Kpi::AverageTimePerUnit => "Average Time Per Unit",
            Kpi::MappingTime => "Mapping Time",
        }
    }
}

impl fmt::Display for Kpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Kpi {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A metric value: a duration in seconds, or the not-available sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KpiValue {
    Duration(f64),
    NotAvailable,
}

impl KpiValue {
    pub fn seconds(self) -> Option<f64> {
        match self {
            KpiValue::Duration(secs) => Some(secs),
            KpiValue::NotAvailable => None,
        }
    }
}

impl fmt::Display for KpiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiValue::Duration(secs) => write!(f, "{:.2}s", secs),
            KpiValue::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for KpiValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One validated start/end pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleInterval {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Duration in seconds (always positive)
    pub seconds: f64,
    /// Unit events within `[start, end]`
    pub units: usize,
}

/// All metrics derived from one event list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    pub values: BTreeMap<Kpi, KpiValue>,
    pub cycles: Vec<CycleInterval>,
    /// Units attributed across all valid cycles
    pub total_units: usize,
}

impl KpiReport {
    /// Value of a metric (always present in a computed report)
    pub fn get(&self, kpi: Kpi) -> KpiValue {
        self.values.get(&kpi).copied().unwrap_or(KpiValue::NotAvailable)
    }
}

/// Seconds between two timestamps, with microsecond resolution
pub fn seconds_between(start: Timestamp, end: Timestamp) -> f64 {
    let delta = end - start;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// Pair cycle starts with ends and attribute units to each valid pair
///
/// Inputs need not be sorted. Runs as a merge over the sorted sequences with
/// pointers that only move forward.
pub fn pair_cycles(starts: &[Timestamp], ends: &[Timestamp], units: &[Timestamp]) -> Vec<CycleInterval> {
    let starts = sorted(starts);
    let ends = sorted(ends);
    let units = sorted(units);

    let mut cycles = Vec::new();
    // First end strictly after the current start
    let mut end_idx = 0;
    // First unit at or after the current start / strictly after the current end
    let mut unit_lo = 0;
    let mut unit_hi = 0;

    for (index, &start) in starts.iter().enumerate() {
        while end_idx < ends.len() && ends[end_idx] <= start {
            end_idx += 1;
        }
        let Some(&end) = ends.get(end_idx) else {
            break;
        };

        // An end belongs to the latest start before it; tied starts count once
        if let Some(&next_start) = starts.get(index + 1) {
            if next_start < end || next_start == start {
                log::trace!("Cycle start {} superseded by {}", start, next_start);
                continue;
            }
        }

        let seconds = seconds_between(start, end);
        if seconds <= 0.0 {
            continue;
        }

        while unit_lo < units.len() && units[unit_lo] < start {
            unit_lo += 1;
        }
        unit_hi = unit_hi.max(unit_lo);
        while unit_hi < units.len() && units[unit_hi] <= end {
            unit_hi += 1;
        }

        cycles.push(CycleInterval {
            start,
            end,
            seconds,
            units: unit_hi - unit_lo,
        });
    }

    cycles
}

fn sorted(timestamps: &[Timestamp]) -> Vec<Timestamp> {
    let mut out = timestamps.to_vec();
    out.sort_unstable();
    out
}

/// Mapping interval: earliest start state to latest completion
pub fn mapping_time(events: &[Event], config: &KpiConfig) -> KpiValue {
    let start = events
        .iter()
        .filter(|e| e.field(&Field::PortState) == Some(config.mapping_start_state.as_str()))
        .map(Event::timestamp)
        .min();
    let end = events
        .iter()
        .filter(|e| e.classification().event_code() == Some(config.mapping_end_code))
        .map(Event::timestamp)
        .max();

    match (start, end) {
        (Some(start), Some(end)) => {
            let seconds = seconds_between(start, end);
            if seconds > 0.0 {
                KpiValue::Duration(seconds)
            } else {
                KpiValue::NotAvailable
            }
        }
        _ => KpiValue::NotAvailable,
    }
}

/// Compute every KPI from a finished event list
pub fn compute_kpis(events: &[Event], config: &KpiConfig) -> KpiReport {
    let timestamps_of = |code: u32| -> Vec<Timestamp> {
        events
            .iter()
            .filter(|e| e.classification().event_code() == Some(code))
            .map(Event::timestamp)
            .collect()
    };

    let cycles = pair_cycles(
        &timestamps_of(config.cycle_start_code),
        &timestamps_of(config.cycle_end_code),
        &timestamps_of(config.unit_code),
    );

    let total_seconds: f64 = cycles.iter().map(|c| c.seconds).sum();
    let total_units: usize = cycles.iter().map(|c| c.units).sum();

    let cycle_time = if cycles.is_empty() {
        KpiValue::NotAvailable
    } else {
        KpiValue::Duration(total_seconds / cycles.len() as f64)
    };
    let per_unit = if total_units > 0 {
        KpiValue::Duration(total_seconds / total_units as f64)
    } else {
        KpiValue::NotAvailable
    };

    log::debug!(
        "{} valid cycles, {} units attributed",
        cycles.len(),
        total_units
    );

    let mut values = BTreeMap::new();
    values.insert(Kpi::CycleTime, cycle_time);
    values.insert(Kpi::AverageTimePerUnit, per_unit);
    values.insert(Kpi::MappingTime, mapping_time(events, config));

    KpiReport {
        values,
        cycles,
        total_units,
    }
}
