//! Human-readable event descriptions
//!
//! One generator per classification, plus the generic fallbacks used when no
//! specialised generator is registered for a code.

use crate::tables::{AlarmState, ReferenceTables};
use crate::types::{Field, FieldMap, NOT_AVAILABLE};

/// A pure description generator for one classification
pub type DescribeFn = fn(&FieldMap, &ReferenceTables) -> String;

fn get<'a>(fields: &'a FieldMap, field: &Field) -> &'a str {
    fields.get(field).map(String::as_str).unwrap_or(NOT_AVAILABLE)
}

pub fn describe_port_status(fields: &FieldMap, tables: &ReferenceTables) -> String {
    let state = get(fields, &Field::PortState);
    let state_text = tables.port_state_description(state).unwrap_or("Unknown State");
    format!(
        "Port {} status changed to {} ({}).",
        get(fields, &Field::PortId),
        state,
        state_text
    )
}

pub fn describe_id_read(fields: &FieldMap, _tables: &ReferenceTables) -> String {
    let prefix = if fields.get(&Field::ResultCode).map(String::as_str) == Some("0") {
        ""
    } else {
        "ERROR: "
    };
    let slot = fields
        .get(&Field::SlotInfo)
        .map(|slot| format!("Slot: {}", slot))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    format!(
        "{}Read Panel ID '{}' from Lot '{}' in {}. Result: {}.",
        prefix,
        get(fields, &Field::PanelId),
        get(fields, &Field::LotId),
        slot,
        get(fields, &Field::Result)
    )
}

pub fn describe_magazine_docked(fields: &FieldMap, _tables: &ReferenceTables) -> String {
    format!(
        "Magazine '{}' docked at Port {} by Operator '{}'.",
        get(fields, &Field::MagazineId),
        get(fields, &Field::PortId),
        get(fields, &Field::OperatorId)
    )
}

pub fn describe_alarm(fields: &FieldMap, _tables: &ReferenceTables) -> String {
    let state = get(fields, &Field::AlarmState);
    let prefix = if AlarmState::from_category(state) == Some(AlarmState::Set) {
        "ALARM: "
    } else {
        ""
    };
    let text = fields
        .get(&Field::AlarmText)
        .map(String::as_str)
        .unwrap_or("Unknown Alarm");
    format!(
        "{}Alarm '{}' ({}) changed to: {}.",
        prefix,
        get(fields, &Field::AlarmId),
        text,
        state
    )
}

pub fn describe_status_variable(fields: &FieldMap, _tables: &ReferenceTables) -> String {
    let name = fields
        .get(&Field::StatusVariableName)
        .map(String::as_str)
        .unwrap_or("Unknown SVID");
    format!(
        "Status Update: {} is now '{}'.",
        name,
        get(fields, &Field::StatusVariableValue)
    )
}

/// Host command, with lot and source port when both were sent
pub fn describe_command(command: &str, fields: &FieldMap, tables: &ReferenceTables) -> String {
    let param = |name: &str| {
        fields
            .get(&Field::Parameter(name.to_string()))
            .map(String::as_str)
    };
    let lot = param("LOTID").or_else(|| fields.get(&Field::LotId).map(String::as_str));
    let port = param("SRCPORTID");

    match (lot, port) {
        (Some(lot), Some(port)) => format!(
            "Host Command: Sent `{}` for Lot '{}' on Port {}.",
            command, lot, port
        ),
        _ => format!(
            "Host Command: Sent `{}`. ({})",
            command,
            tables.command_description(command).unwrap_or(command)
        ),
    }
}

/// Fallback for event codes without a dedicated generator
pub fn describe_generic_event(code: u32, fields: &FieldMap, tables: &ReferenceTables) -> String {
    let name = tables
        .event_name(code)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Unknown CEID {}", code));
    if fields.is_empty() {
        format!("Event: {} (CEID {}) occurred.", name, code)
    } else {
        format!("Event: {} (CEID {}) occurred. Data: {}", name, code, format_fields(fields))
    }
}

/// Fallback for blocks that matched nothing in the tables
///
/// `unknown_code` is the block's raw code (`Unknown CEID 9999`), if it had one.
pub fn describe_unclassified(
    message_name: Option<&str>,
    unknown_code: Option<&str>,
    tables: &ReferenceTables,
) -> String {
    let base = match message_name {
        Some(name) => match tables.message_description(name) {
            Some(text) => format!("Unclassified {} message ({})", name, text),
            None => format!("Unclassified {} message", name),
        },
        None => "Unknown log entry".to_string(),
    };
    match unknown_code {
        Some(code) => format!("{}: {}.", base, code),
        None => format!("{}.", base),
    }
}

/// `Key=value` pairs in field order
pub fn format_fields(fields: &FieldMap) -> String {
    fields
        .iter()
        .map(|(field, value)| format!("{}={}", field, value))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(Field, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(field, value)| (field.clone(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_describe_port_status() {
        let tables = ReferenceTables::loadport();
        let f = fields(&[(Field::PortId, "1"), (Field::PortState, "MIC")]);
        assert_eq!(
            describe_port_status(&f, &tables),
            "Port 1 status changed to MIC (Magazine In Complete (Magazine is loaded and locked))."
        );

        let f = fields(&[(Field::PortId, "2"), (Field::PortState, "XYZ")]);
        assert_eq!(
            describe_port_status(&f, &tables),
            "Port 2 status changed to XYZ (Unknown State)."
        );
    }

    #[test]
    fn test_describe_id_read_error_prefix() {
        let tables = ReferenceTables::loadport();
        let ok = fields(&[
            (Field::PanelId, "PNL-1"),
            (Field::LotId, "LOT-1"),
            (Field::SlotInfo, "3"),
            (Field::ResultCode, "0"),
            (Field::Result, "Success (OK)"),
        ]);
        assert_eq!(
            describe_id_read(&ok, &tables),
            "Read Panel ID 'PNL-1' from Lot 'LOT-1' in Slot: 3. Result: Success (OK)."
        );

        let failed = fields(&[(Field::ResultCode, "5"), (Field::Result, "Timeout")]);
        assert_eq!(
            describe_id_read(&failed, &tables),
            "ERROR: Read Panel ID 'N/A' from Lot 'N/A' in N/A. Result: Timeout."
        );
    }

    #[test]
    fn test_describe_alarm() {
        let tables = ReferenceTables::loadport();
        let set = fields(&[
            (Field::AlarmId, "1002"),
            (Field::AlarmText, "Emergency Stop Activated"),
            (Field::AlarmState, "AlarmSet"),
        ]);
        assert_eq!(
            describe_alarm(&set, &tables),
            "ALARM: Alarm '1002' (Emergency Stop Activated) changed to: AlarmSet."
        );

        let clear = fields(&[(Field::AlarmState, "AlarmClear")]);
        assert_eq!(
            describe_alarm(&clear, &tables),
            "Alarm 'N/A' (Unknown Alarm) changed to: AlarmClear."
        );
    }

    #[test]
    fn test_describe_command() {
        let tables = ReferenceTables::loadport();
        let with_target = fields(&[
            (Field::Parameter("LOTID".to_string()), "LOT-7"),
            (Field::Parameter("SRCPORTID".to_string()), "1"),
        ]);
        assert_eq!(
            describe_command("LOADSTART", &with_target, &tables),
            "Host Command: Sent `LOADSTART` for Lot 'LOT-7' on Port 1."
        );
        assert_eq!(
            describe_command("PAUSE", &FieldMap::new(), &tables),
            "Host Command: Sent `PAUSE`. (Command to pause the current process cycle.)"
        );
    }

    #[test]
    fn test_generic_fallback_names_the_code() {
        let tables = ReferenceTables::loadport();
        assert_eq!(
            describe_generic_event(151, &FieldMap::new(), &tables),
            "Event: LoadStarted (CEID 151) occurred."
        );
        let f = fields(&[(Field::OperatorId, "OP1"), (Field::MagazineId, "MAG-2")]);
        assert_eq!(
            describe_generic_event(184, &f, &tables),
            "Event: RequestOperatorLogin (CEID 184) occurred. Data: OperatorID=OP1, MagazineID=MAG-2"
        );
        assert_eq!(
            describe_generic_event(9999, &FieldMap::new(), &ReferenceTables::new()),
            "Event: Unknown CEID 9999 (CEID 9999) occurred."
        );
    }

    #[test]
    fn test_describe_unclassified() {
        let tables = ReferenceTables::loadport();
        assert_eq!(
            describe_unclassified(Some("S1F3"), None, &tables),
            "Unclassified S1F3 message (Selected Equipment Status Request)."
        );
        assert_eq!(
            describe_unclassified(Some("Custom"), None, &tables),
            "Unclassified Custom message."
        );
        assert_eq!(describe_unclassified(None, None, &tables), "Unknown log entry.");
    }

    #[test]
    fn test_describe_unclassified_names_the_raw_code() {
        let tables = ReferenceTables::loadport();
        assert_eq!(
            describe_unclassified(Some("S6F11"), Some("Unknown CEID 9999"), &tables),
            "Unclassified S6F11 message (Event Report Send): Unknown CEID 9999."
        );
        assert_eq!(
            describe_unclassified(None, Some("Unknown RCMD RECALIBRATE"), &tables),
            "Unknown log entry: Unknown RCMD RECALIBRATE."
        );
    }
}
