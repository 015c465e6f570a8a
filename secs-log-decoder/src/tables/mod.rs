//! Reference tables
//!
//! Read-only lookup data that gives meaning to the codes found in a trace,
//! plus the built-in loadport knowledge base.

pub mod loadport;
pub mod reference;

// Re-export key types for convenience
pub use reference::{AlarmState, ReferenceTables, TableStats};
