//! Convert command implementation.
//!
//! The convert command:
//! 1. Loads the trace file
//! 2. Rebuilds and aggregates call stacks
//! 3. Encodes the pprof profile
//! 4. Writes the gzip-compressed profile

use super::models::ConvertArgs;
use crate::aggregator::{convert_trace, ConvertOptions};
use crate::output::write_pprof;
use crate::parser::load_trace_file;
use crate::profile::Profile;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Convert command arguments
///
/// # Returns
/// The converted profile, for callers that want to inspect it
///
/// # Errors
/// * Trace loading errors (missing file, bad gzip, bad JSON)
/// * Conversion errors
/// * File write errors
pub fn execute_convert(args: ConvertArgs) -> Result<Profile> {
    let options = args
        .workers
        .map(ConvertOptions::with_workers)
        .unwrap_or_default();

    info!("Step 1/4: Loading {}...", args.input.display());
    let trace = load_trace_file(&args.input)
        .with_context(|| format!("Failed to load trace {}", args.input.display()))?;

    info!("Step 2/4: Building call stacks (using {} workers)...", options.num_workers);
    let start = Instant::now();
    let profile = convert_trace(&trace, &options).context("Failed to convert trace")?;
    info!("Conversion complete in {:.2}s", start.elapsed().as_secs_f64());

    info!("Step 3/4: Encoding profile...");
    let bytes = profile.encode();
    debug!("Encoded {} bytes", bytes.len());

    info!("Step 4/4: Writing {}...", args.output.display());
    write_pprof(&bytes, &args.output).context("Failed to write profile")?;

    info!(
        "✓ {} samples, {} locations, {} functions, {} strings",
        profile.sample.len(),
        profile.location.len(),
        profile.function.len(),
        profile.string_table.len()
    );

    Ok(profile)
}

/// Validate convert arguments
///
/// **Public** - can be called before execute_convert for early validation
pub fn validate_convert_args(args: &ConvertArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input trace path cannot be empty");
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output profile path cannot be empty");
    }

    if args.input == args.output {
        anyhow::bail!("Output path must differ from the input trace");
    }

    if args.workers == Some(0) {
        anyhow::bail!("workers must be greater than 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_convert_args_valid() {
        let args = ConvertArgs {
            input: PathBuf::from("trace.json"),
            ..Default::default()
        };
        assert!(validate_convert_args(&args).is_ok());
    }

    #[test]
    fn test_validate_convert_args_empty_input() {
        assert!(validate_convert_args(&ConvertArgs::default()).is_err());
    }

    #[test]
    fn test_validate_convert_args_same_path() {
        let args = ConvertArgs {
            input: PathBuf::from("trace.json"),
            output: PathBuf::from("trace.json"),
            workers: None,
        };
        assert!(validate_convert_args(&args).is_err());
    }

    #[test]
    fn test_validate_convert_args_zero_workers() {
        let args = ConvertArgs {
            input: PathBuf::from("trace.json"),
            workers: Some(0),
            ..Default::default()
        };
        assert!(validate_convert_args(&args).is_err());
    }
}
