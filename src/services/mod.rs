//! Service layer for machine monitoring
//!
//! Services encapsulate the polling loops, the machine registry and the
//! supervisor that manages them.

pub mod poller;
pub mod registry;
pub mod signal;
pub mod snapshot;
pub mod supervisor;

pub use poller::{backoff_delay, CycleReport, MachinePoller, PollerSettings, VariableReading};
pub use registry::Registry;
pub use signal::StopSignal;
pub use snapshot::{MachineSnapshot, MachineState, PlantSnapshot, VariableSnapshot, VariableState};
pub use supervisor::{Supervisor, SupervisorSettings};
