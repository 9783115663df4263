//! Trace parsing and event model.
//!
//! This module handles:
//! - Loading trace JSON (plain or gzip)
//! - The trace event record and thread id normalization
//! - Filtering events that take part in conversion
//! - Defining the analysis report schema

pub mod event;
pub mod schema;
pub mod trace_file;

// Re-export main types
pub use event::{ThreadId, TraceData, TraceEvent};
pub use schema::{AnalysisReport, StatsEntry};
pub use trace_file::{load_trace_file, parse_trace_reader, parse_trace_str};
