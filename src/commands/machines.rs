//! Machines command implementation
//!
//! Lists configured machines, their variables and responsible technicians.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, MachineList};
use crate::commands::load_config;
use crate::error::Result;

/// Execute the machines command
pub fn run_machines(format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let registry = config.registry()?;

    print_output(&MachineList::from(&registry), format)?;

    Ok(())
}
