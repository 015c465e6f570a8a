//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct holds the injected reference tables and strategy table
//! and turns trace text into an ordered list of events.

use crate::config::DecoderConfig;
use crate::extractor::BlockScan;
use crate::strategy::StrategyTable;
use crate::tables::{ReferenceTables, TableStats};
use crate::tokenizer::{LineTokenizer, Token};
use crate::types::{Classification, Event, Result};

/// The main decoder struct - entry point for all decoding operations
#[derive(Debug, Clone)]
pub struct Decoder {
    /// Lookup tables (read-only for the lifetime of the decoder)
    tables: ReferenceTables,
    /// Code → extractor/describer strategies
    strategies: StrategyTable,
}

impl Decoder {
    /// Create a decoder over the given tables with the built-in strategies
    pub fn new(tables: ReferenceTables) -> Self {
        Self::with_strategies(tables, StrategyTable::loadport())
    }

    /// Create a decoder with a custom strategy table
    pub fn with_strategies(tables: ReferenceTables, strategies: StrategyTable) -> Self {
        Self { tables, strategies }
    }

    /// Decoder over the built-in loadport knowledge base
    pub fn loadport() -> Self {
        Self::new(ReferenceTables::loadport())
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// Decode trace text lazily, one event per data block
    ///
    /// # Example
    /// ```
    /// use secs_log_decoder::{Decoder, DecoderConfig};
    ///
    /// let trace = "2025/10/03 14:47:38.125000,[Core:Receive],MessageName=S6F11\n<U4 [1] 181>\n.\n";
    /// let decoder = Decoder::loadport();
    /// let config = DecoderConfig::new();
    /// let events: Vec<_> = decoder.decode_iter(trace, &config).collect();
    /// assert_eq!(events.len(), 1);
    /// assert_eq!(events[0].classification().event_code(), Some(181));
    /// ```
    pub fn decode_iter<'a>(&'a self, text: &'a str, config: &'a DecoderConfig) -> EventIterator<'a> {
        EventIterator {
            tokens: LineTokenizer::new(text, config),
            decoder: self,
        }
    }

    /// Decode trace text into the full, log-ordered event list
    pub fn decode_str(&self, text: &str, config: &DecoderConfig) -> Vec<Event> {
        let events: Vec<Event> = self.decode_iter(text, config).collect();
        log::info!("Decoded {} events", events.len());
        events
    }

    /// Decode raw bytes, rejecting input that is not UTF-8
    pub fn decode_bytes(&self, bytes: &[u8], config: &DecoderConfig) -> Result<Vec<Event>> {
        let text = std::str::from_utf8(bytes)?;
        Ok(self.decode_str(text, config))
    }

    /// Get statistics about the loaded reference tables
    pub fn table_stats(&self) -> TableStats {
        self.tables.stats()
    }

    /// Turn one token into an event, if it carries a data block
    fn assemble(&self, token: Token) -> Option<Event> {
        let Token { header, block } = token;
        let block = block?;

        let scan = BlockScan::new(&block.text, &self.tables);
        let classification = scan.classification(&self.tables);
        let fields = self.strategies.extract(&scan, &classification, &self.tables);
        let unknown_code = match classification {
            Classification::Unclassified => scan.unknown_code(),
            _ => None,
        };
        let description = self.strategies.describe(
            &classification,
            &fields,
            header.message_name.as_deref(),
            unknown_code.as_deref(),
            &self.tables,
        );

        log::debug!(
            "Line {}: {} with {} fields",
            header.line,
            classification,
            fields.len()
        );

        Some(Event::new(header, classification, fields, description))
    }
}

/// Iterator that assembles tokens into events
///
/// Header lines without a data block produce no event; every block does,
/// classified or not.
pub struct EventIterator<'a> {
    tokens: LineTokenizer<'a>,
    decoder: &'a Decoder,
}

impl<'a> Iterator for EventIterator<'a> {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let token = self.tokens.next()?;
            if let Some(event) = self.decoder.assemble(token) {
                return Some(event);
            }
        }
    }
}

/// Decode trace text with explicit tables and the built-in strategies
pub fn decode_log(text: &str, tables: &ReferenceTables, config: &DecoderConfig) -> Vec<Event> {
    Decoder::new(tables.clone()).decode_str(text, config)
}
