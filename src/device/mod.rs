//! Device access layer
//!
//! Provides trait-based abstractions over machine connectivity for testability.

pub mod simulated;
pub mod tcp;
pub mod traits;

pub use simulated::{SignalProfile, SimulatedReader, SimulatedSession};
pub use tcp::{check_endpoint, parse_endpoint};
pub use traits::{ConnectOptions, DeviceReader, DeviceSession};
