//! Output JSON schema definitions for analysis reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use serde::{Deserialize, Serialize};

/// Top-level analysis report written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for compatibility checking
    pub version: String,

    pub total_events: u64,
    pub complete_events: u64,
    pub skipped_zero_duration: u64,
    pub converted_events: u64,
    pub unique_operations: usize,

    /// Sum of converted event durations
    pub total_time_ns: i64,

    /// All categories, by time descending
    pub categories: Vec<StatsEntry>,

    /// Top operations, by time descending
    pub top_operations: Vec<StatsEntry>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// One row of a grouped statistic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsEntry {
    pub name: String,
    pub count: u64,
    pub time_ns: i64,
}
