//! Analyze command implementation.
//!
//! Prints trace-wide statistics, a per-category breakdown and the top
//! operations by total time. Optionally writes the same data as JSON.

use super::models::AnalyzeArgs;
use super::utils::truncate_name;
use crate::aggregator::{analyze_trace, TraceAnalysis};
use crate::output::write_report;
use crate::parser::load_trace_file;
use crate::utils::config::{MAX_OPERATION_NAME_WIDTH, MAX_TOP_OPERATIONS};
use anyhow::{Context, Result};
use log::info;
use std::fmt;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
pub fn execute_analyze(args: AnalyzeArgs) -> Result<TraceAnalysis> {
    let trace = load_trace_file(&args.input)
        .with_context(|| format!("Failed to load trace {}", args.input.display()))?;

    let analysis = analyze_trace(&trace);

    println!("{}", format_analysis(&analysis, args.top));

    if let Some(json_path) = &args.json {
        write_report(&analysis.to_report(args.top), json_path)
            .context("Failed to write analysis report")?;
        info!("✓ Report written to: {}", json_path.display());
    }

    Ok(analysis)
}

/// Validate analyze arguments
pub fn validate_analyze_args(args: &AnalyzeArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input trace path cannot be empty");
    }

    if args.top == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    if args.top > MAX_TOP_OPERATIONS {
        anyhow::bail!("top is too large (max {})", MAX_TOP_OPERATIONS);
    }

    Ok(())
}

fn ms(ns: i64) -> f64 {
    ns as f64 / 1e6
}

/// Plain-text tables for an analysis
///
/// **Public** - separated from printing so it can be tested
pub struct AnalysisTable<'a> {
    pub analysis: &'a TraceAnalysis,
    pub top: usize,
}

impl fmt::Display for AnalysisTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = self.analysis;

        writeln!(f, "PyTorch Profile Analysis")?;
        writeln!(f, "========================")?;
        writeln!(f)?;
        writeln!(f, "Total events:           {}", analysis.total_events)?;
        writeln!(f, "Complete events (ph=X): {}", analysis.complete_events)?;
        writeln!(f, "Skipped (dur<=0):       {}", analysis.skipped_zero_duration)?;
        writeln!(f, "Converted events:       {}", analysis.converted_events)?;
        writeln!(f, "Unique operations:      {}", analysis.unique_operations)?;
        writeln!(
            f,
            "Total time:             {:.3} ms ({:.3} s)",
            ms(analysis.total_time_ns),
            analysis.total_time_ns as f64 / 1e9
        )?;
        writeln!(f)?;

        writeln!(f, "By Category:")?;
        writeln!(f, "{:<30} {:>12} {:>10}", "Category", "Time (ms)", "Count")?;
        writeln!(f, "{}", "-".repeat(54))?;
        for entry in analysis.sorted_categories() {
            writeln!(
                f,
                "{:<30} {:>12.3} {:>10}",
                entry.name,
                ms(entry.time_ns),
                entry.count
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Top {} Operations:", self.top)?;
        writeln!(f, "{:<60} {:>12} {:>10}", "Operation", "Time (ms)", "Count")?;
        writeln!(f, "{}", "-".repeat(84))?;
        for entry in analysis.sorted_operations().into_iter().take(self.top) {
            writeln!(
                f,
                "{:<60} {:>12.3} {:>10}",
                truncate_name(&entry.name, MAX_OPERATION_NAME_WIDTH),
                ms(entry.time_ns),
                entry.count
            )?;
        }

        Ok(())
    }
}

/// Render the analysis as plain-text tables
pub fn format_analysis(analysis: &TraceAnalysis, top: usize) -> String {
    AnalysisTable { analysis, top }.to_string()
}
