//! Torch Trace pprof
//!
//! Converts PyTorch profiler traces (Chrome Trace Event JSON) into pprof
//! call profiles.
//!
//! Per-thread call stacks are rebuilt from the flat interval events,
//! identical stacks are merged across threads, and the result is encoded
//! as `profile.proto`.
//!
//! ## Getting Started
//!
//! ```bash
//! torch2pprof convert trace.json profile.pb.gz
//! go tool pprof -http=:8080 profile.pb.gz
//! ```
//!
//! ## Library use
//!
//! ```no_run
//! use torch_trace_pprof::aggregator::{convert_trace, ConvertOptions};
//! use torch_trace_pprof::parser::load_trace_file;
//!
//! let trace = load_trace_file("trace.json").unwrap();
//! let profile = convert_trace(&trace, &ConvertOptions::default()).unwrap();
//! let bytes = profile.encode();
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod profile;
pub mod utils;
