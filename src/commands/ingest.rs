//! Ingest command implementation
//!
//! Reads an alert payload detected by an external process and delivers it
//! through the terminal notifier.

use crate::alerts::{AlertDispatcher, AlertPayload, AlertRouter, TerminalNotifier};
use crate::cli::args::{IngestArgs, OutputFormat};
use crate::cli::output::{print_output, DeliverySummary};
use crate::commands::load_config;
use crate::device::SimulatedReader;
use crate::error::{ConfigError, Result};
use crate::services::{Supervisor, SupervisorSettings};

use std::io::{self, Read};
use std::sync::Arc;

/// Execute the ingest command
pub fn run_ingest(args: &IngestArgs, format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;

    let content = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let payload = parse_payload(&content)?;

    // No pollers are started; the supervisor is only used for routing
    let dispatcher = AlertDispatcher::new(
        AlertRouter::new(config.templates.clone()),
        Arc::new(TerminalNotifier::stderr()),
    );
    let supervisor = Supervisor::with_registry(
        Arc::new(SimulatedReader::new()),
        dispatcher,
        SupervisorSettings::default(),
        config.registry()?,
    );

    let report = supervisor.ingest_alert(&payload)?;
    print_output(&DeliverySummary::from(&report), format)?;

    Ok(())
}

/// Parse a JSON alert payload
pub fn parse_payload(content: &str) -> std::result::Result<AlertPayload, ConfigError> {
    Ok(serde_json::from_str(content)?)
}
