use crate::utils::config::DEFAULT_TOP_OPERATIONS;
use std::path::PathBuf;

/// Arguments for the convert command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// Trace JSON (optionally gzip-compressed)
    pub input: PathBuf,

    /// Output pprof file (gzip-compressed protobuf)
    pub output: PathBuf,

    /// Worker pool size (None = available parallelism)
    pub workers: Option<usize>,
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from("profile.pb.gz"),
            workers: None,
        }
    }
}

/// Arguments for the analyze command
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub input: PathBuf,

    /// Number of operations to list
    pub top: usize,

    /// Optional JSON report path
    pub json: Option<PathBuf>,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            top: DEFAULT_TOP_OPERATIONS,
            json: None,
        }
    }
}
