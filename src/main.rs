//! torch2pprof CLI
//!
//! Converts PyTorch profiler traces to pprof profiles and prints trace
//! statistics.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use torch_trace_pprof::commands::{
    display_version, execute_analyze, execute_convert, validate_analyze_args,
    validate_convert_args, AnalyzeArgs, ConvertArgs,
};
use torch_trace_pprof::utils::config::DEFAULT_TOP_OPERATIONS;

/// torch2pprof - PyTorch profiler trace to pprof converter
#[derive(Parser, Debug)]
#[command(name = "torch2pprof")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input trace (shorthand for `convert <INPUT> <OUTPUT>`)
    input: Option<PathBuf>,

    /// Output profile (shorthand for `convert <INPUT> <OUTPUT>`)
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a trace to a gzip-compressed pprof profile
    Convert {
        /// Trace JSON, optionally gzip-compressed
        input: PathBuf,

        /// Output profile (.pb.gz)
        output: PathBuf,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long, env = "TORCH2PPROF_WORKERS")]
        workers: Option<usize>,
    },

    /// Print trace statistics by category and operation
    Analyze {
        /// Trace JSON, optionally gzip-compressed
        input: PathBuf,

        /// Number of top operations to display
        #[arg(long, default_value_t = DEFAULT_TOP_OPERATIONS)]
        top: usize,

        /// Also write the statistics as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Some(Commands::Convert {
            input,
            output,
            workers,
        }) => run_convert(ConvertArgs {
            input,
            output,
            workers,
        })?,

        Some(Commands::Analyze { input, top, json }) => {
            let args = AnalyzeArgs { input, top, json };
            validate_analyze_args(&args)?;
            execute_analyze(args)?;
        }

        Some(Commands::Version) => display_version(),

        None => match (cli.input, cli.output) {
            (Some(input), Some(output)) => run_convert(ConvertArgs {
                input,
                output,
                workers: None,
            })?,
            _ => anyhow::bail!("Usage: torch2pprof [convert] <input.json> <output.pb.gz> (see --help)"),
        },
    }

    Ok(())
}

/// Validate and run a conversion
///
/// **Private** - shared by `convert` and the bare two-argument form
fn run_convert(args: ConvertArgs) -> Result<()> {
    validate_convert_args(&args)?;
    execute_convert(args)?;
    Ok(())
}
