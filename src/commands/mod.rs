//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod ingest;
pub mod machines;
pub mod probe;
pub mod run;
pub mod status;

pub use ingest::run_ingest;
pub use machines::run_machines;
pub use probe::run_probe;
pub use run::run_monitor;
pub use status::run_status;

use crate::config::{Config, ConfigBuilder};
use crate::error::Result;

/// Load configuration from `path` or the default locations
pub(crate) fn load_config(path: Option<&str>) -> Result<Config> {
    Ok(ConfigBuilder::new().with_file(path)?.build()?)
}
