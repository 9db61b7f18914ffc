//! Domain models for machmon
//!
//! This module contains the machine, variable and technician types.
//! Types are validated on construction (fail-fast pattern).

pub mod machine;
pub mod technician;
pub mod variable;

pub use machine::{MachineId, MachineSpec, MachineStatus};
pub use technician::Technician;
pub use variable::{Direction, Thresholds, VariableId, VariableSpec};
