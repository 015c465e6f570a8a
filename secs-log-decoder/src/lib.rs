//! SECS Log Decoder Library
//!
//! A stateless, reusable library for decoding SECS/GEM loadport communication
//! traces into classified events and deriving timing KPIs from them.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Tokenizes trace text into header records and their data blocks
//! - Classifies each block by event code, alarm or host command
//! - Extracts named fields through per-code strategy tables
//! - Pairs cycle boundaries and attributes units to compute KPIs
//!
//! The library does NOT:
//! - Read files or touch the filesystem
//! - Hold process-wide lookup tables (tables are passed in explicitly)
//! - Render reports
//!
//! All higher-level functionality is in the application layer (secs-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use secs_log_decoder::{compute_kpis, summarize, Decoder, DecoderConfig, KpiConfig};
//!
//! let trace = std::fs::read_to_string("AOP101ULD.txt").unwrap();
//!
//! // Built-in loadport tables and strategies
//! let decoder = Decoder::loadport();
//! let config = DecoderConfig::new().with_send_marker("Core:Send");
//!
//! let events = decoder.decode_str(&trace, &config);
//! for event in &events {
//!     println!("[{}] {}", event.timestamp(), event.description());
//! }
//!
//! let kpis = compute_kpis(&events, &KpiConfig::default());
//! let summary = summarize(&events);
//! println!("{} ({} cycles)", summary.assessment, kpis.cycles.len());
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod describe;
pub mod extractor;
pub mod kpi;
pub mod strategy;
pub mod summary;
pub mod tables;
pub mod tokenizer;
pub mod types;

// Re-export main types for convenience
pub use config::{DecoderConfig, KpiConfig};
pub use decoder::{decode_log, Decoder, EventIterator};
pub use kpi::{compute_kpis, CycleInterval, Kpi, KpiReport, KpiValue};
pub use strategy::StrategyTable;
pub use summary::{summarize, Assessment, RunSummary};
pub use tables::{AlarmState, ReferenceTables, TableStats};
pub use types::{
    Classification, DecoderError, Direction, Event, Field, FieldMap, Result, Timestamp,
    NOT_AVAILABLE,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
