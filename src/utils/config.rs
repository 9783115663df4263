//! Configuration and constants for the converter and CLI.

/// Phase code of duration-bearing ("complete") trace events
pub const COMPLETE_PHASE: &str = "X";

/// Microseconds to nanoseconds
pub const NANOS_PER_MICRO: f64 = 1000.0;

/// Capacity of the fan-in channel between thread workers and the aggregator
pub const SAMPLE_CHANNEL_CAPACITY: usize = 10_000;

// pprof metadata written into every converted profile.
// The period is a nominal 1ms even though traces are event-driven, not sampled.
pub const SAMPLE_TYPES: &[(&str, &str)] = &[("samples", "count"), ("time", "nanoseconds")];
pub const PERIOD_TYPE: (&str, &str) = ("cpu", "nanoseconds");
pub const PERIOD_NANOS: i64 = 1_000_000;

/// Gzip magic number (first two bytes of any gzip stream)
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Default number of operations shown by `analyze`
pub const DEFAULT_TOP_OPERATIONS: usize = 20;
pub const MAX_TOP_OPERATIONS: usize = 10_000;

/// Operation names wider than this are truncated in the analyze table
pub const MAX_OPERATION_NAME_WIDTH: usize = 58;

/// Current analysis report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";
