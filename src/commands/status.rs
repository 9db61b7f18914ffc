//! Status command implementation
//!
//! Polls every configured machine once, synchronously, and prints the result.

use crate::alerts::{AlertDispatcher, AlertRouter, TerminalNotifier};
use crate::cli::args::OutputFormat;
use crate::cli::output::print_output;
use crate::commands::load_config;
use crate::config::Config;
use crate::device::{DeviceReader, SimulatedReader};
use crate::error::{AppError, Result};
use crate::services::{MachinePoller, MachineSnapshot, PlantSnapshot, StopSignal};

use chrono::Utc;
use std::sync::{Arc, PoisonError, RwLock};

/// Execute the status command
pub fn run_status(format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    if config.machines.is_empty() {
        return Err(AppError::NoMachines);
    }

    let reader = {
        let registry = config.registry()?;
        SimulatedReader::for_machines(registry.machines().map(Arc::as_ref))
    };
    let snapshot = poll_once(&config, Arc::new(reader))?;

    print_output(&snapshot, format)?;

    Ok(())
}

/// Run one poll cycle per machine on the calling thread
///
/// Alerts raised by the cycle are delivered through the terminal notifier.
pub fn poll_once<R: DeviceReader>(config: &Config, reader: Arc<R>) -> Result<PlantSnapshot> {
    let registry = Arc::new(RwLock::new(config.registry()?));
    let dispatcher = Arc::new(AlertDispatcher::new(
        AlertRouter::new(config.templates.clone()),
        Arc::new(TerminalNotifier::stderr()),
    ));
    let settings = config.general.poller_settings();

    let specs: Vec<_> = registry
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .machines()
        .cloned()
        .collect();

    let mut machines = Vec::with_capacity(specs.len());
    for spec in &specs {
        let mut poller = MachinePoller::new(
            spec.id.clone(),
            Arc::clone(&registry),
            Arc::clone(&reader),
            Arc::clone(&dispatcher),
            StopSignal::new(),
            settings,
        );
        if let Some(report) = poller.poll_once() {
            log::debug!("Machine {} polled: {}", spec.id, report.status);
        }

        let state = poller.state_handle();
        let state = state.read().unwrap_or_else(PoisonError::into_inner);
        machines.push(MachineSnapshot::build(spec, &state));
    }

    Ok(PlantSnapshot {
        taken_at: Utc::now(),
        machines,
    })
}
