//! Stack reconstruction, aggregation and trace statistics.
//!
//! This module transforms parsed trace events into:
//! - Per-event call stacks (one thread at a time)
//! - Aggregated pprof samples (all threads, in parallel)
//! - Category and operation summaries

pub mod converter;
pub mod metrics;
pub mod stack_builder;

// Re-export main types and functions
pub use converter::{convert_trace, group_by_thread, ConvertOptions, StackAggregator};
pub use metrics::{analyze_trace, GroupStats, TraceAnalysis};
pub use stack_builder::{reconstruct_stacks, StackFrame, StackSample};
