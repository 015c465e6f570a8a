//! Core types for the SECS log decoder library
//!
//! This module defines the records the decoder produces while walking a host
//! communication trace. Header records and data blocks only live for the
//! duration of the tokenizing pass; `Event` is the durable output.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Timestamp type used throughout the decoder (traces carry no zone)
pub type Timestamp = NaiveDateTime;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Placeholder rendered wherever a value is missing
pub const NOT_AVAILABLE: &str = "N/A";

/// Errors that can occur around decoding
///
/// Nothing inside a decoding pass is fatal; these cover the boundary
/// (input encoding, configuration, injected tables).
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Input is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidEncoding { offset: usize },

    #[error("Invalid decoder configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid reference table: {0}")]
    InvalidTable(String),
}

impl From<std::str::Utf8Error> for DecoderError {
    fn from(err: std::str::Utf8Error) -> Self {
        DecoderError::InvalidEncoding {
            offset: err.valid_up_to(),
        }
    }
}

/// Direction of a logged message relative to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// Host to equipment (`Core:Send`)
    Outbound,
    /// Equipment to host (`Core:Receive`)
    Inbound,
    /// Any other log line; never carries a data block
    None,
}

impl Direction {
    /// True if a data block may follow a header with this direction
    pub fn carries_data(self) -> bool {
        !matches!(self, Direction::None)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outbound => write!(f, "Host->Equip"),
            Direction::Inbound => write!(f, "Equip->Host"),
            Direction::None => write!(f, "-"),
        }
    }
}

/// One timestamped header line of the trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    /// Timestamp at the start of the line
    pub timestamp: Timestamp,
    /// Send/receive direction derived from the log type
    pub direction: Direction,
    /// Message name from the `Message=` / `MessageName=` label, if any
    pub message_name: Option<String>,
    /// 1-based line number in the input
    pub line: usize,
}

/// The structural payload following a send/receive header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlock {
    /// Trimmed block lines joined with `\n`
    pub text: String,
    /// 1-based line number of the first block line
    pub first_line: usize,
    /// False if the block ran to end of input without a terminator
    pub terminated: bool,
}

/// The single class an event was assigned during extraction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Classification {
    /// A collection event (CEID) from the event-code table
    EventCode(u32),
    /// An alarm-class code (alarm set / clear); the reported alarm id is a field
    Alarm(u32),
    /// A host remote command (RCMD)
    Command(String),
    /// Nothing in the block matched a reference table
    Unclassified,
}

impl Classification {
    /// The event code, only for plain event-code classifications
    pub fn event_code(&self) -> Option<u32> {
        match self {
            Classification::EventCode(code) => Some(*code),
            _ => None,
        }
    }

    /// The alarm-class code, only for alarm classifications
    pub fn alarm_code(&self) -> Option<u32> {
        match self {
            Classification::Alarm(code) => Some(*code),
            _ => None,
        }
    }

    /// The command token, only for command classifications
    pub fn command(&self) -> Option<&str> {
        match self {
            Classification::Command(cmd) => Some(cmd),
            _ => None,
        }
    }

    /// Short label used for per-class counting
    pub fn kind(&self) -> &'static str {
        match self {
            Classification::EventCode(_) => "event",
            Classification::Alarm(_) => "alarm",
            Classification::Command(_) => "command",
            Classification::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::EventCode(code) => write!(f, "CEID {}", code),
            Classification::Alarm(code) => write!(f, "Alarm CEID {}", code),
            Classification::Command(cmd) => write!(f, "RCMD {}", cmd),
            Classification::Unclassified => write!(f, "{}", NOT_AVAILABLE),
        }
    }
}

/// Field names an extractor may fill
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    OperatorId,
    MagazineId,
    LotId,
    PanelId,
    PortId,
    PortState,
    SlotInfo,
    Orientation,
    ResultCode,
    /// Result text resolved from the result-code table
    Result,
    StatusVariableId,
    /// Status variable name resolved from the status-variable table
    StatusVariableName,
    StatusVariableValue,
    AlarmId,
    AlarmState,
    /// Alarm text resolved from the alarm table
    AlarmText,
    /// A named host command parameter (e.g. `LOTID`)
    Parameter(String),
}

impl Field {
    /// Column-style name of the field
    pub fn name(&self) -> &str {
        match self {
            Field::OperatorId => "OperatorID",
            Field::MagazineId => "MagazineID",
            Field::LotId => "LotID",
            Field::PanelId => "PanelID",
            Field::PortId => "PortID",
            Field::PortState => "PortState",
            Field::SlotInfo => "SlotInfo",
            Field::Orientation => "Orientation",
            Field::ResultCode => "ResultCode",
            Field::Result => "Result",
            Field::StatusVariableId => "SVID",
            Field::StatusVariableName => "SVID_Name",
            Field::StatusVariableValue => "SVID_Value",
            Field::AlarmId => "AlarmID",
            Field::AlarmState => "AlarmState",
            Field::AlarmText => "AlarmText",
            Field::Parameter(name) => name,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Serialized as the plain name so field maps become JSON objects.
impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Extracted fields of one event, ordered by field
pub type FieldMap = BTreeMap<Field, String>;

/// A classified, described entry of the trace
///
/// Events are built once by the assembler and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    timestamp: Timestamp,
    direction: Direction,
    message_name: Option<String>,
    classification: Classification,
    fields: FieldMap,
    description: String,
    line: usize,
}

impl Event {
    /// Build an event from its header and extraction results
    pub fn new(
        header: HeaderRecord,
        classification: Classification,
        fields: FieldMap,
        description: String,
    ) -> Self {
        Self {
            timestamp: header.timestamp,
            direction: header.direction,
            message_name: header.message_name,
            classification,
            fields,
            description,
            line: header.line,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Message name, or `N/A` when the header had no label
    pub fn message_name(&self) -> &str {
        self.message_name.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Value of a single field, if extracted
    pub fn field(&self, field: &Field) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// 1-based line number of the header this event came from
    pub fn line(&self) -> usize {
        self.line
    }
}
