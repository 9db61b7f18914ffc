//! Run command implementation
//!
//! Starts one poller per configured machine against the simulated device
//! source and prints alerts to the terminal until interrupted.

use crate::alerts::TerminalNotifier;
use crate::cli::args::{OutputFormat, RunArgs};
use crate::cli::output::{print_output, Message};
use crate::config::ConfigBuilder;
use crate::device::SimulatedReader;
use crate::domain::MachineStatus;
use crate::error::{AppError, Result};
use crate::services::{StopSignal, Supervisor};

use std::io;
use std::sync::Arc;
use std::time::Duration;

/// How often the run loop logs a plant summary
const SUMMARY_INTERVAL: Duration = Duration::from_secs(60);

/// Execute the run command
pub fn run_monitor(
    args: &RunArgs,
    format: OutputFormat,
    config_path: Option<&str>,
    verbose: bool,
) -> Result<()> {
    let config = ConfigBuilder::new()
        .with_file(config_path)?
        .with_verbose(verbose.then_some(true))
        .with_interval(args.interval)
        .with_recovery_notices(args.recovery_notices.then_some(true))
        .build()?;

    if config.machines.is_empty() {
        return Err(AppError::NoMachines);
    }

    let registry = config.registry()?;
    let reader = SimulatedReader::for_machines(registry.machines().map(Arc::as_ref));

    if config.general.verbose {
        log::info!("Starting monitor");
        log::info!("  Machines: {}", registry.len());
        log::info!("  Technicians: {}", registry.technicians().len());
        log::info!("  Poll interval: {}s", config.general.poll_interval_secs);
        log::info!("  Recovery notices: {}", config.general.recovery_notices);
    }

    let supervisor = Supervisor::from_config(
        &config,
        Arc::new(reader),
        Arc::new(TerminalNotifier::new()),
    )?;

    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        handler_stop.stop();
    })
    .map_err(|e| io::Error::other(format!("Failed to set signal handler: {}", e)))?;

    log::info!("Monitoring {} machine(s). Press Ctrl+C to stop.", registry.len());

    while !stop.wait_timeout(SUMMARY_INTERVAL) {
        let snapshot = supervisor.snapshot();
        log::info!(
            "{} online, {} offline, {} connecting",
            snapshot.count_status(MachineStatus::Online),
            snapshot.count_status(MachineStatus::Offline),
            snapshot.count_status(MachineStatus::Connecting)
        );
    }

    supervisor.shutdown();

    let msg = Message {
        message: format!("Stopped monitoring {} machine(s)", registry.len()),
        success: true,
    };
    print_output(&msg, format)?;

    Ok(())
}
