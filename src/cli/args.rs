//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Industrial machine telemetry monitor
///
/// Polls machine variables, classifies readings against thresholds and
/// notifies the technicians responsible for each machine.
#[derive(Parser, Debug)]
#[command(name = "machmon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "MACHMON_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll every configured machine until interrupted
    Run(RunArgs),

    /// Poll every machine once and print the result
    Status,

    /// List configured machines and their technicians
    Machines,

    /// Check whether an endpoint accepts TCP connections
    Probe(ProbeArgs),

    /// Route and deliver an externally detected alert
    Ingest(IngestArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Default poll interval in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Notify technicians when a variable returns to normal
    #[arg(long)]
    pub recovery_notices: bool,
}

/// Arguments for the probe command
#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Endpoint to check (e.g. opc.tcp://10.0.0.1:4840 or host:port)
    pub endpoint: String,

    /// Connect timeout in milliseconds
    #[arg(long, default_value = "3000", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: u64,
}

/// Arguments for the ingest command
#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// JSON alert payload file; reads stdin when omitted
    pub file: Option<PathBuf>,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
