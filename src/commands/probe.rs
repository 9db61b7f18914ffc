//! Probe command implementation
//!
//! Checks TCP reachability of a machine endpoint.

use crate::cli::args::{OutputFormat, ProbeArgs};
use crate::cli::output::{print_output, ProbeResult};
use crate::device::check_endpoint;
use crate::error::Result;

use std::time::Duration;

/// Execute the probe command
///
/// An unreachable endpoint is reported, not treated as a command failure.
pub fn run_probe(args: &ProbeArgs, format: OutputFormat) -> Result<()> {
    let endpoint = args.endpoint.trim();
    let timeout = Duration::from_millis(args.timeout_ms);

    let result = match check_endpoint(endpoint, timeout) {
        Ok(addr) => ProbeResult {
            endpoint: endpoint.to_string(),
            reachable: true,
            address: Some(addr.to_string()),
            error: None,
        },
        Err(e) => {
            log::debug!("Probe of {} failed: {}", endpoint, e);
            ProbeResult {
                endpoint: endpoint.to_string(),
                reachable: false,
                address: None,
                error: Some(e.to_string()),
            }
        }
    };

    print_output(&result, format)?;

    Ok(())
}
