//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod convert;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use analyze::{execute_analyze, format_analysis, validate_analyze_args, AnalysisTable};
pub use convert::{execute_convert, validate_convert_args};
pub use models::{AnalyzeArgs, ConvertArgs};
pub use utils::display_version;
