//! Extraction and description strategy tables
//!
//! Maps a classification code to the pure functions that extract its fields
//! and describe it. Codes without an entry fall back to the generic
//! extractors and descriptions.

use crate::describe::{self, DescribeFn};
use crate::extractor::{self, BlockScan, ExtractFn};
use crate::tables::ReferenceTables;
use crate::types::{Classification, FieldMap};
use std::collections::HashMap;
use std::fmt;

/// Code → strategy lookup used by the decoder
#[derive(Clone, Default)]
pub struct StrategyTable {
    extractors: HashMap<u32, ExtractFn>,
    describers: HashMap<u32, DescribeFn>,
}

impl fmt::Debug for StrategyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut extractors: Vec<_> = self.extractors.keys().collect();
        let mut describers: Vec<_> = self.describers.keys().collect();
        extractors.sort_unstable();
        describers.sort_unstable();
        f.debug_struct("StrategyTable")
            .field("extractors", &extractors)
            .field("describers", &describers)
            .finish()
    }
}

impl StrategyTable {
    /// Create an empty table (every code uses the fallbacks)
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in loadport strategies
    pub fn loadport() -> Self {
        Self::new()
            .with_strategy(141, extractor::extract_port_status, describe::describe_port_status)
            .with_strategy(120, extractor::extract_id_read, describe::describe_id_read)
            .with_strategy(181, extractor::extract_magazine_docked, describe::describe_magazine_docked)
            .with_strategy(16, extractor::extract_status_variable, describe::describe_status_variable)
    }

    /// Builder method: register both strategies for a code
    pub fn with_strategy(mut self, code: u32, extract: ExtractFn, describe: DescribeFn) -> Self {
        self.extractors.insert(code, extract);
        self.describers.insert(code, describe);
        self
    }

    /// Register an extractor for a code, replacing any previous one
    pub fn register_extractor(&mut self, code: u32, extract: ExtractFn) {
        self.extractors.insert(code, extract);
    }

    /// Register a describer for a code, replacing any previous one
    pub fn register_describer(&mut self, code: u32, describe: DescribeFn) {
        self.describers.insert(code, describe);
    }

    pub fn extractor(&self, code: u32) -> Option<ExtractFn> {
        self.extractors.get(&code).copied()
    }

    pub fn describer(&self, code: u32) -> Option<DescribeFn> {
        self.describers.get(&code).copied()
    }

    /// Extract the fields of a classified block
    pub fn extract(
        &self,
        scan: &BlockScan<'_>,
        classification: &Classification,
        tables: &ReferenceTables,
    ) -> FieldMap {
        match classification {
            Classification::EventCode(code) => self
                .extractor(*code)
                .unwrap_or(extractor::extract_labeled)(scan, tables),
            Classification::Alarm(code) => self
                .extractor(*code)
                .unwrap_or(extractor::extract_alarm)(scan, tables),
            Classification::Command(_) => extractor::extract_command_parameters(scan, tables),
            Classification::Unclassified => FieldMap::new(),
        }
    }

    /// Describe a classified event
    ///
    /// `unknown_code` is only used for unclassified blocks.
    pub fn describe(
        &self,
        classification: &Classification,
        fields: &FieldMap,
        message_name: Option<&str>,
        unknown_code: Option<&str>,
        tables: &ReferenceTables,
    ) -> String {
        match classification {
            Classification::EventCode(code) => match self.describer(*code) {
                Some(describe) => describe(fields, tables),
                None => describe::describe_generic_event(*code, fields, tables),
            },
            Classification::Alarm(code) => self
                .describer(*code)
                .unwrap_or(describe::describe_alarm)(fields, tables),
            Classification::Command(command) => describe::describe_command(command, fields, tables),
            Classification::Unclassified => {
                describe::describe_unclassified(message_name, unknown_code, tables)
            }
        }
    }
}
