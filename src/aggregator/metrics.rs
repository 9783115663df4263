//! Summary statistics over trace events.
//!
//! Plain grouping by category and by operation name. No stack
//! reconstruction happens here; every convertible event counts once.

use crate::parser::schema::{AnalysisReport, StatsEntry};
use crate::parser::TraceData;
use crate::utils::config::REPORT_SCHEMA_VERSION;
use log::debug;
use std::collections::HashMap;

/// Count and total time for one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub count: u64,
    pub time_ns: i64,
}

/// Trace-wide statistics
///
/// **Public** - returned from analyze_trace
#[derive(Debug, Clone, Default)]
pub struct TraceAnalysis {
    /// Every event in the trace, any phase
    pub total_events: u64,

    /// Events with phase "X"
    pub complete_events: u64,

    /// Complete events dropped for a zero or negative duration
    pub skipped_zero_duration: u64,

    /// Events that would take part in conversion
    pub converted_events: u64,

    /// Distinct operation names among converted events
    pub unique_operations: usize,

    pub total_time_ns: i64,
    pub category_stats: HashMap<String, GroupStats>,
    pub operation_stats: HashMap<String, GroupStats>,
}

/// Analyze a trace
///
/// **Public** - main entry point for the analyze command
pub fn analyze_trace(trace: &TraceData) -> TraceAnalysis {
    let mut analysis = TraceAnalysis::default();

    for event in &trace.trace_events {
        analysis.total_events += 1;
        if !event.is_complete() {
            continue;
        }
        analysis.complete_events += 1;
        if !event.is_convertible() {
            analysis.skipped_zero_duration += 1;
            continue;
        }

        analysis.converted_events += 1;
        let duration_ns = event.duration_ns();
        analysis.total_time_ns = analysis.total_time_ns.saturating_add(duration_ns);

        let by_cat = analysis.category_stats.entry(event.cat.clone()).or_default();
        by_cat.count += 1;
        by_cat.time_ns = by_cat.time_ns.saturating_add(duration_ns);

        let by_op = analysis.operation_stats.entry(event.name.clone()).or_default();
        by_op.count += 1;
        by_op.time_ns = by_op.time_ns.saturating_add(duration_ns);
    }

    analysis.unique_operations = analysis.operation_stats.len();

    debug!(
        "Analyzed {} events: {} converted, {} unique operations",
        analysis.total_events, analysis.converted_events, analysis.unique_operations
    );

    analysis
}

/// Time descending, then name for a stable order
fn sorted_entries(stats: &HashMap<String, GroupStats>) -> Vec<StatsEntry> {
    let mut entries: Vec<StatsEntry> = stats
        .iter()
        .map(|(name, s)| StatsEntry {
            name: name.clone(),
            count: s.count,
            time_ns: s.time_ns,
        })
        .collect();
    entries.sort_by(|a, b| b.time_ns.cmp(&a.time_ns).then_with(|| a.name.cmp(&b.name)));
    entries
}

impl TraceAnalysis {
    /// Categories by total time, descending
    pub fn sorted_categories(&self) -> Vec<StatsEntry> {
        sorted_entries(&self.category_stats)
    }

    /// Operations by total time, descending
    pub fn sorted_operations(&self) -> Vec<StatsEntry> {
        sorted_entries(&self.operation_stats)
    }

    /// Build the JSON report, keeping the top `top_n` operations
    ///
    /// **Public** - used by the analyze command for `--json`
    pub fn to_report(&self, top_n: usize) -> AnalysisReport {
        use chrono::Utc;

        AnalysisReport {
            version: REPORT_SCHEMA_VERSION.to_string(),
            total_events: self.total_events,
            complete_events: self.complete_events,
            skipped_zero_duration: self.skipped_zero_duration,
            converted_events: self.converted_events,
            unique_operations: self.unique_operations,
            total_time_ns: self.total_time_ns,
            categories: self.sorted_categories(),
            top_operations: self.sorted_operations().into_iter().take(top_n).collect(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}
