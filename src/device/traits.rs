//! Trait definitions for device access
//!
//! These traits abstract over the industrial protocol client so the engine can
//! be driven by real devices, the simulator, or test mocks.

use crate::error::DeviceError;
use std::time::Duration;

/// Timeouts applied to device sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Upper bound for opening a session
    pub connect_timeout: Duration,
    /// Upper bound for a single variable read
    pub read_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            read_timeout: Duration::from_secs(5),
        }
    }
}

/// An open session to one machine
pub trait DeviceSession: Send {
    /// Read the current value of a node
    ///
    /// Implementations must return within the session's read timeout; the
    /// poller discards values that arrive later.
    fn read(&mut self, node: &str) -> Result<f64, DeviceError>;

    /// Close the session
    fn disconnect(self)
    where
        Self: Sized,
    {
    }
}

/// Opens sessions to machines
pub trait DeviceReader: Send + Sync {
    /// The session type returned by this reader
    type Session: DeviceSession;

    /// Open a session to an endpoint
    fn connect(&self, endpoint: &str, options: &ConnectOptions)
        -> Result<Self::Session, DeviceError>;

    /// Check whether an endpoint accepts a session
    fn probe(&self, endpoint: &str, timeout: Duration) -> bool {
        let options = ConnectOptions {
            connect_timeout: timeout,
            read_timeout: timeout,
        };
        match self.connect(endpoint, &options) {
            Ok(session) => {
                session.disconnect();
                true
            }
            Err(e) => {
                log::debug!("Probe of {} failed: {}", endpoint, e);
                false
            }
        }
    }
}
