//! Field extraction engine
//!
//! Classifies a data block against the reference tables and pulls semantic
//! fields out of the SECS-II text. Matching is best-effort per sub-field: a
//! pattern that does not match leaves its field out and nothing else changes.
//!
//! Two heuristics are kept for compatibility with existing traces:
//! - the first numeric item that is a known event code classifies the block
//! - magazine-docked fields are read by position, not by label

use crate::tables::ReferenceTables;
use crate::types::{Classification, Field, FieldMap};
use regex::Regex;
use std::sync::OnceLock;

/// A pure field extractor for one classification
pub type ExtractFn = fn(&BlockScan<'_>, &ReferenceTables) -> FieldMap;

struct Patterns {
    numeric_item: Regex,
    string_item: Regex,
    command_item: Regex,
    port_status: Regex,
    status_variable_pair: Regex,
    parameter_pair: Regex,
    operator_label: Regex,
    magazine_label: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        numeric_item: Regex::new(r"<\s*U\d\s*\[\d+\]\s*(\d+)\s*>").expect("Invalid numeric item regex"),
        string_item: Regex::new(r"<\s*(?:A|U\d)\s*\[\d+\]\s*'([^']*)'\s*>")
            .expect("Invalid string item regex"),
        command_item: Regex::new(r"<\s*A\s*\[\d+\]\s*'([A-Z_]{5,})'\s*>").expect("Invalid command regex"),
        port_status: Regex::new(r"<\s*U1\s*\[1\]\s*(\d+)\s*>\s*<\s*A\s*\[3\]\s*'(\w+)'\s*>")
            .expect("Invalid port status regex"),
        status_variable_pair: Regex::new(
            r"<\s*L\s*\[2\]\s*<\s*U\d\s*\[\d+\]\s*(\d+)\s*>\s*<\s*A\s*\[\d+\]\s*'([^']*)'\s*>\s*>",
        )
        .expect("Invalid status variable regex"),
        parameter_pair: Regex::new(
            r"<\s*L\s*\[2\]\s*<\s*A\s*\[\d+\]\s*'([^']+)'\s*>\s*<\s*(?:A|U\d)\s*\[\d+\]\s*(?:'([^']*)'|(\d+))\s*>\s*>",
        )
        .expect("Invalid parameter regex"),
        operator_label: Regex::new(r"'OPERATORID'\s*>\s*<\s*A\s*\[\d+\]\s*'(\w+)'")
            .expect("Invalid operator label regex"),
        magazine_label: Regex::new(r"'MAGAZINEID'\s*>\s*<\s*A\s*\[\d+\]\s*'([\w-]+)'")
            .expect("Invalid magazine label regex"),
    })
}

/// A data block with its items pre-scanned in textual order
#[derive(Debug, Clone)]
pub struct BlockScan<'a> {
    /// Full block text
    pub text: &'a str,
    /// Values of every `<U? [n] value>` item
    pub numeric_items: Vec<&'a str>,
    /// Values of every quoted `<A|U? [n] 'value'>` item
    pub string_items: Vec<&'a str>,
    /// Position and value of the first numeric item found in the event-code table
    pub primary: Option<(usize, u32)>,
    /// First command token found in the command table
    pub command: Option<&'a str>,
    /// First numeric item, known to the tables or not
    pub first_id: Option<u32>,
    /// First command-shaped token, known to the tables or not
    pub first_token: Option<&'a str>,
}

impl<'a> BlockScan<'a> {
    /// Scan a block against the reference tables
    pub fn new(text: &'a str, tables: &ReferenceTables) -> Self {
        let p = patterns();

        let numeric_items: Vec<&'a str> = p
            .numeric_item
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();

        let string_items = p
            .string_item
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();

        let primary = numeric_items.iter().enumerate().find_map(|(index, raw)| {
            raw.parse::<u32>()
                .ok()
                .filter(|code| tables.event_codes.contains_key(code))
                .map(|code| (index, code))
        });

        let tokens: Vec<&'a str> = p
            .command_item
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();
        let command = tokens
            .iter()
            .copied()
            .find(|token| tables.commands.contains_key(*token));

        let first_id = numeric_items.first().and_then(|raw| raw.parse::<u32>().ok());
        let first_token = tokens.first().copied();

        Self {
            text,
            numeric_items,
            string_items,
            primary,
            command,
            first_id,
            first_token,
        }
    }

    /// Raw code of a block nothing in the tables recognised
    ///
    /// `Unknown CEID n` for the first numeric item, else `Unknown RCMD X`
    /// for the first command-shaped token.
    pub fn unknown_code(&self) -> Option<String> {
        match (self.first_id, self.first_token) {
            (Some(id), _) => Some(format!("Unknown CEID {}", id)),
            (None, Some(token)) => Some(format!("Unknown RCMD {}", token)),
            (None, None) => None,
        }
    }

    /// Resolve the single classification of this block
    ///
    /// A recognised command wins over any event code in the same block. An
    /// event code whose category is an alarm class becomes an alarm.
    pub fn classification(&self, tables: &ReferenceTables) -> Classification {
        if let Some(command) = self.command {
            return Classification::Command(command.to_string());
        }
        match self.primary {
            Some((_, code)) if tables.alarm_state(code).is_some() => Classification::Alarm(code),
            Some((_, code)) => Classification::EventCode(code),
            None => Classification::Unclassified,
        }
    }

    /// Numeric item at a position, in scan order
    pub fn numeric(&self, index: usize) -> Option<&'a str> {
        self.numeric_items.get(index).copied()
    }

    /// Quoted item at a position, in scan order
    pub fn string(&self, index: usize) -> Option<&'a str> {
        self.string_items.get(index).copied()
    }
}

fn insert(fields: &mut FieldMap, field: Field, value: impl Into<String>) {
    fields.insert(field, value.into());
}

/// Port status change: `<U1 [1] port> <A [3] 'STATE'>`
pub fn extract_port_status(scan: &BlockScan<'_>, _tables: &ReferenceTables) -> FieldMap {
    let mut fields = FieldMap::new();
    if let Some(caps) = patterns().port_status.captures(scan.text) {
        insert(&mut fields, Field::PortId, &caps[1]);
        insert(&mut fields, Field::PortState, &caps[2]);
    }
    fields
}

/// ID read: positional quoted items (lot, panel, orientation, result, slot)
pub fn extract_id_read(scan: &BlockScan<'_>, tables: &ReferenceTables) -> FieldMap {
    let mut fields = FieldMap::new();
    if scan.string_items.len() < 5 {
        return fields;
    }

    let result_code = scan.string_items[4];
    let result_text = tables
        .result_description(result_code)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Unknown Code({})", result_code));

    insert(&mut fields, Field::LotId, scan.string_items[1]);
    insert(&mut fields, Field::PanelId, scan.string_items[2]);
    insert(&mut fields, Field::Orientation, scan.string_items[3]);
    insert(&mut fields, Field::ResultCode, result_code);
    insert(&mut fields, Field::Result, result_text);
    if let Some(slot) = scan.string(5) {
        insert(&mut fields, Field::SlotInfo, slot);
    }
    fields
}

/// Magazine docked: 2nd numeric item is the port, 2nd and 3rd quoted items
/// are the magazine and operator ids
pub fn extract_magazine_docked(scan: &BlockScan<'_>, _tables: &ReferenceTables) -> FieldMap {
    let mut fields = FieldMap::new();
    if let Some(port) = scan.numeric(1) {
        insert(&mut fields, Field::PortId, port);
    }
    if let Some(magazine) = scan.string(1) {
        insert(&mut fields, Field::MagazineId, magazine);
    }
    if let Some(operator) = scan.string(2) {
        insert(&mut fields, Field::OperatorId, operator);
    }
    fields
}

/// Status variable change: the first `<L [2] <U? svid> <A 'value'>>` pair
pub fn extract_status_variable(scan: &BlockScan<'_>, tables: &ReferenceTables) -> FieldMap {
    let mut fields = FieldMap::new();
    let Some(caps) = patterns().status_variable_pair.captures(scan.text) else {
        return fields;
    };
    let Ok(svid) = caps[1].parse::<u32>() else {
        return fields;
    };

    let name = tables
        .status_variable_description(svid)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Unknown SVID({})", svid));

    insert(&mut fields, Field::StatusVariableId, svid.to_string());
    insert(&mut fields, Field::StatusVariableName, name);
    insert(&mut fields, Field::StatusVariableValue, &caps[2]);
    fields
}

/// Alarm report: the alarm id is the numeric item right after the
/// classifying code; the state is that code's own category name
pub fn extract_alarm(scan: &BlockScan<'_>, tables: &ReferenceTables) -> FieldMap {
    let mut fields = FieldMap::new();
    let Some((index, code)) = scan.primary else {
        return fields;
    };

    if let Some(state) = tables.alarm_state(code) {
        insert(&mut fields, Field::AlarmState, state.category());
    }
    if let Some(alarm_id) = scan.numeric(index + 1).and_then(|raw| raw.parse::<u32>().ok()) {
        let text = tables
            .alarm_description(alarm_id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Unknown Alarm ID ({})", alarm_id));
        insert(&mut fields, Field::AlarmId, alarm_id.to_string());
        insert(&mut fields, Field::AlarmText, text);
    }
    fields
}

/// Labeled ids for event reports without a dedicated extractor
pub fn extract_labeled(scan: &BlockScan<'_>, _tables: &ReferenceTables) -> FieldMap {
    let p = patterns();
    let mut fields = FieldMap::new();
    if let Some(caps) = p.operator_label.captures(scan.text) {
        insert(&mut fields, Field::OperatorId, &caps[1]);
    }
    if let Some(caps) = p.magazine_label.captures(scan.text) {
        insert(&mut fields, Field::MagazineId, &caps[1]);
    }
    fields
}

/// Remote command parameters: every `<L [2] <A 'NAME'> <A|U? value>>` pair
pub fn extract_command_parameters(scan: &BlockScan<'_>, _tables: &ReferenceTables) -> FieldMap {
    let mut fields = FieldMap::new();
    for caps in patterns().parameter_pair.captures_iter(scan.text) {
        let Some(value) = caps.get(2).or_else(|| caps.get(3)) else {
            continue;
        };
        insert(&mut fields, Field::Parameter(caps[1].to_string()), value.as_str());
    }
    fields
}
