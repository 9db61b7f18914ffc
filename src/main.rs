//! machmon - industrial machine telemetry monitor
//!
//! A command-line tool that polls machine variables, raises threshold alerts
//! and routes them to the responsible technicians.

use clap::Parser;
use machmon::cli::args::{generate_completions, Cli, Commands};
use machmon::commands::{run_ingest, run_machines, run_monitor, run_probe, run_status};
use machmon::error::{AppError, ConfigError};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Set log level based on verbose flag
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = cli.config.as_deref();

    match &cli.command {
        Commands::Run(args) => run_monitor(args, cli.format, config, cli.verbose),

        Commands::Status => run_status(cli.format, config),

        Commands::Machines => run_machines(cli.format, config),

        Commands::Probe(args) => run_probe(args, cli.format),

        Commands::Ingest(args) => run_ingest(args, cli.format, config),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::NoMachines => {
            eprintln!();
            eprintln!("Hint: Add [[machines]] entries to the configuration file.");
            eprintln!("      Use --config or MACHMON_CONFIG to point at it.");
        }
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Default locations are /etc/machmon/config.toml,");
            eprintln!("      ~/.config/machmon/config.toml, ./machmon.toml and ./system_config.json.");
        }
        AppError::Config(ConfigError::UnknownMachine(_)) => {
            eprintln!();
            eprintln!("Hint: Set \"destination\" in the payload to deliver without routing.");
        }
        _ => {}
    }
}
