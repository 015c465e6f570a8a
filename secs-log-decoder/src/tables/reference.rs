//! Unified reference tables
//!
//! Combines every code→text mapping the decoder consults into a single
//! structure. The decoder never mutates it; callers build one up front
//! (usually from [`ReferenceTables::loadport`]) and hand it over.

use crate::types::{DecoderError, Result};
use std::collections::HashMap;

/// Category name of the alarm-set event code
pub const ALARM_SET: &str = "AlarmSet";
/// Category name of the alarm-clear event code
pub const ALARM_CLEAR: &str = "AlarmClear";

/// State carried by an alarm-class event code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Set,
    Clear,
}

impl AlarmState {
    /// Map an event-code category name to an alarm state
    pub fn from_category(name: &str) -> Option<Self> {
        match name {
            ALARM_SET => Some(AlarmState::Set),
            ALARM_CLEAR => Some(AlarmState::Clear),
            _ => None,
        }
    }

    /// Category name as it appears in the event-code table
    pub fn category(self) -> &'static str {
        match self {
            AlarmState::Set => ALARM_SET,
            AlarmState::Clear => ALARM_CLEAR,
        }
    }
}

/// All lookup tables used during extraction and description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTables {
    /// Collection event id (CEID) → event name
    pub event_codes: HashMap<u32, String>,
    /// Remote command (RCMD) → description
    pub commands: HashMap<String, String>,
    /// Stream/function code (e.g. "S6F11") → description
    pub messages: HashMap<String, String>,
    /// Port state code (e.g. "MIC") → description
    pub port_states: HashMap<String, String>,
    /// ID read result code → description
    pub result_codes: HashMap<String, String>,
    /// Alarm id (ALID) → description
    pub alarms: HashMap<u32, String>,
    /// Status variable id (SVID) → description
    pub status_variables: HashMap<u32, String>,
}

impl ReferenceTables {
    /// Create empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add an event code
    pub fn with_event_code(mut self, code: u32, name: impl Into<String>) -> Self {
        self.event_codes.insert(code, name.into());
        self
    }

    /// Builder method: add a remote command
    pub fn with_command(mut self, command: impl Into<String>, description: impl Into<String>) -> Self {
        self.commands.insert(command.into(), description.into());
        self
    }

    /// Builder method: add a message description
    pub fn with_message(mut self, message: impl Into<String>, description: impl Into<String>) -> Self {
        self.messages.insert(message.into(), description.into());
        self
    }

    /// Builder method: add a port state description
    pub fn with_port_state(mut self, state: impl Into<String>, description: impl Into<String>) -> Self {
        self.port_states.insert(state.into(), description.into());
        self
    }

    /// Builder method: add an ID read result description
    pub fn with_result_code(mut self, code: impl Into<String>, description: impl Into<String>) -> Self {
        self.result_codes.insert(code.into(), description.into());
        self
    }

    /// Builder method: add an alarm description
    pub fn with_alarm(mut self, alarm_id: u32, description: impl Into<String>) -> Self {
        self.alarms.insert(alarm_id, description.into());
        self
    }

    /// Builder method: add a status variable description
    pub fn with_status_variable(mut self, svid: u32, description: impl Into<String>) -> Self {
        self.status_variables.insert(svid, description.into());
        self
    }

    /// Overlay another set of tables; entries in `other` win
    pub fn merge(&mut self, other: ReferenceTables) {
        self.event_codes.extend(other.event_codes);
        self.commands.extend(other.commands);
        self.messages.extend(other.messages);
        self.port_states.extend(other.port_states);
        self.result_codes.extend(other.result_codes);
        self.alarms.extend(other.alarms);
        self.status_variables.extend(other.status_variables);
    }

    /// Event name for a code
    pub fn event_name(&self, code: u32) -> Option<&str> {
        self.event_codes.get(&code).map(String::as_str)
    }

    /// Alarm state of an event code, if its category is an alarm class
    pub fn alarm_state(&self, code: u32) -> Option<AlarmState> {
        self.event_name(code).and_then(AlarmState::from_category)
    }

    pub fn command_description(&self, command: &str) -> Option<&str> {
        self.commands.get(command).map(String::as_str)
    }

    pub fn message_description(&self, message: &str) -> Option<&str> {
        self.messages.get(message).map(String::as_str)
    }

    pub fn port_state_description(&self, state: &str) -> Option<&str> {
        self.port_states.get(state).map(String::as_str)
    }

    pub fn result_description(&self, code: &str) -> Option<&str> {
        self.result_codes.get(code).map(String::as_str)
    }

    pub fn alarm_description(&self, alarm_id: u32) -> Option<&str> {
        self.alarms.get(&alarm_id).map(String::as_str)
    }

    pub fn status_variable_description(&self, svid: u32) -> Option<&str> {
        self.status_variables.get(&svid).map(String::as_str)
    }

    /// Reject entries with empty keys or names
    pub fn validate(&self) -> Result<()> {
        if let Some((code, _)) = self.event_codes.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(DecoderError::InvalidTable(format!("event code {} has an empty name", code)));
        }
        if self.commands.keys().any(|c| c.trim().is_empty()) {
            return Err(DecoderError::InvalidTable("empty remote command key".to_string()));
        }
        Ok(())
    }

    /// Commands that can never be recognised in a block
    ///
    /// Command tokens are only matched as `[A-Z_]{5,}`.
    pub fn unmatchable_commands(&self) -> Vec<&str> {
        let mut commands: Vec<&str> = self
            .commands
            .keys()
            .map(String::as_str)
            .filter(|c| c.len() < 5 || !c.chars().all(|ch| ch.is_ascii_uppercase() || ch == '_'))
            .collect();
        commands.sort_unstable();
        commands
    }

    /// Get table statistics
    pub fn stats(&self) -> TableStats {
        TableStats {
            num_event_codes: self.event_codes.len(),
            num_alarm_codes: self
                .event_codes
                .values()
                .filter(|name| AlarmState::from_category(name).is_some())
                .count(),
            num_commands: self.commands.len(),
            num_alarms: self.alarms.len(),
            num_status_variables: self.status_variables.len(),
        }
    }
}

/// Table statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    /// Total number of event codes
    pub num_event_codes: usize,
    /// Event codes whose category is an alarm class
    pub num_alarm_codes: usize,
    /// Total number of remote commands
    pub num_commands: usize,
    /// Total number of alarm descriptions
    pub num_alarms: usize,
    /// Total number of status variable descriptions
    pub num_status_variables: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tables() {
        let tables = ReferenceTables::new();
        let stats = tables.stats();
        assert_eq!(stats.num_event_codes, 0);
        assert_eq!(stats.num_commands, 0);
        assert!(tables.validate().is_ok());
    }

    #[test]
    fn test_alarm_state_from_event_name() {
        let tables = ReferenceTables::new()
            .with_event_code(101, "AlarmClear")
            .with_event_code(102, "AlarmSet")
            .with_event_code(141, "PortStatusChange");

        assert_eq!(tables.alarm_state(101), Some(AlarmState::Clear));
        assert_eq!(tables.alarm_state(102), Some(AlarmState::Set));
        assert_eq!(tables.alarm_state(141), None);
        assert_eq!(tables.alarm_state(999), None);
        assert_eq!(tables.stats().num_alarm_codes, 2);
    }

    #[test]
    fn test_merge_overrides_entries() {
        let mut tables = ReferenceTables::new()
            .with_alarm(1001, "Load Port Interlock Error")
            .with_port_state("MIC", "Magazine In Complete");
        let site = ReferenceTables::new()
            .with_alarm(1001, "Interlock tripped on port 1")
            .with_alarm(3001, "Vacuum low");

        tables.merge(site);

        assert_eq!(tables.alarm_description(1001), Some("Interlock tripped on port 1"));
        assert_eq!(tables.alarm_description(3001), Some("Vacuum low"));
        assert_eq!(tables.port_state_description("MIC"), Some("Magazine In Complete"));
    }

    #[test]
    fn test_validate_rejects_empty_entries() {
        let tables = ReferenceTables::new().with_event_code(7, " ");
        assert!(matches!(tables.validate(), Err(DecoderError::InvalidTable(_))));

        let tables = ReferenceTables::new().with_command("", "nothing");
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_unmatchable_commands() {
        let tables = ReferenceTables::new()
            .with_command("STOP", "Stop the cycle")
            .with_command("load_start", "lowercase")
            .with_command("LOADSTART", "Start loading");

        assert_eq!(tables.unmatchable_commands(), vec!["STOP", "load_start"]);
        assert!(tables.validate().is_ok());
    }
}
