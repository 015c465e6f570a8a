//! Decoder configuration types
//!
//! This module defines the minimal configuration needed by the decoder library:
//! the markers that shape the trace grammar and the event classes the KPI
//! correlator pairs. Defaults match the loadport host interface logs.

use crate::types::{DecoderError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the tokenizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Log-type substring marking a host-to-equipment message
    #[serde(default = "default_send_marker")]
    pub send_marker: String,

    /// Log-type substring marking an equipment-to-host message
    #[serde(default = "default_receive_marker")]
    pub receive_marker: String,

    /// Prefix of the first line of a data block
    #[serde(default = "default_open_marker")]
    pub open_marker: String,

    /// Line that terminates a data block
    #[serde(default = "default_terminator")]
    pub terminator: String,
}

fn default_send_marker() -> String {
    "Core:Send".to_string()
}

fn default_receive_marker() -> String {
    "Core:Receive".to_string()
}

fn default_open_marker() -> String {
    "<".to_string()
}

fn default_terminator() -> String {
    ".".to_string()
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            send_marker: default_send_marker(),
            receive_marker: default_receive_marker(),
            open_marker: default_open_marker(),
            terminator: default_terminator(),
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the send marker
    pub fn with_send_marker(mut self, marker: impl Into<String>) -> Self {
        self.send_marker = marker.into();
        self
    }

    /// Builder method: set the receive marker
    pub fn with_receive_marker(mut self, marker: impl Into<String>) -> Self {
        self.receive_marker = marker.into();
        self
    }

    /// Builder method: set the block terminator line
    pub fn with_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = terminator.into();
        self
    }

    /// Reject configurations the tokenizer cannot work with
    pub fn validate(&self) -> Result<()> {
        let markers = [
            ("send_marker", &self.send_marker),
            ("receive_marker", &self.receive_marker),
            ("open_marker", &self.open_marker),
            ("terminator", &self.terminator),
        ];
        for (name, value) in markers {
            if value.trim().is_empty() {
                return Err(DecoderError::InvalidConfig(format!("{} must not be empty", name)));
            }
        }
        if self.send_marker == self.receive_marker {
            return Err(DecoderError::InvalidConfig(
                "send_marker and receive_marker must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Event classes paired by the KPI correlator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiConfig {
    /// Event code opening a cycle (MagazineDocked)
    #[serde(default = "default_cycle_start")]
    pub cycle_start_code: u32,

    /// Event code closing a cycle (UnloadFromToolCompleted)
    #[serde(default = "default_cycle_end")]
    pub cycle_end_code: u32,

    /// Event code counted as one transferred unit (UnloadedFromMag)
    #[serde(default = "default_unit")]
    pub unit_code: u32,

    /// Port state that starts the mapping interval (Magazine In Complete)
    #[serde(default = "default_mapping_state")]
    pub mapping_start_state: String,

    /// Event code that ends the mapping interval (MappingCompleted)
    #[serde(default = "default_mapping_end")]
    pub mapping_end_code: u32,
}

fn default_cycle_start() -> u32 {
    181
}

fn default_cycle_end() -> u32 {
    132
}

fn default_unit() -> u32 {
    121
}

fn default_mapping_state() -> String {
    "MIC".to_string()
}

fn default_mapping_end() -> u32 {
    136
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            cycle_start_code: default_cycle_start(),
            cycle_end_code: default_cycle_end(),
            unit_code: default_unit(),
            mapping_start_state: default_mapping_state(),
            mapping_end_code: default_mapping_end(),
        }
    }
}

impl KpiConfig {
    /// Create a new KPI configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the cycle start and end codes
    pub fn with_cycle(mut self, start_code: u32, end_code: u32) -> Self {
        self.cycle_start_code = start_code;
        self.cycle_end_code = end_code;
        self
    }

    /// Builder method: set the unit-transferred code
    pub fn with_unit_code(mut self, code: u32) -> Self {
        self.unit_code = code;
        self
    }

    /// Builder method: set the mapping interval boundaries
    pub fn with_mapping(mut self, start_state: impl Into<String>, end_code: u32) -> Self {
        self.mapping_start_state = start_state.into();
        self.mapping_end_code = end_code;
        self
    }
}
