//! Mock implementations for testing
//!
//! Provides a scripted device reader and a recording notifier so the engine
//! can be exercised without real machines or a messaging provider.

use crate::alerts::Notifier;
use crate::device::{ConnectOptions, DeviceReader, DeviceSession};
use crate::error::{DeliveryError, DeviceError};

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockState {
    /// Values returned in order; the last one repeats
    scripts: HashMap<String, VecDeque<f64>>,
    /// Nodes that fail with the given error
    failures: HashMap<String, DeviceError>,
    unreachable: HashSet<String>,
    read_delay: Duration,
    connects: usize,
    disconnects: usize,
    reads: HashMap<String, usize>,
}

/// Mock device reader with per-node value scripts
#[derive(Debug, Clone, Default)]
pub struct MockReader {
    state: Arc<Mutex<MockState>>,
}

impl MockReader {
    /// Create a reader with no nodes
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: fixed value for a node
    pub fn with_value(self, node: &str, value: f64) -> Self {
        self.set_value(node, value);
        self
    }

    /// Builder: sequence of values for a node
    pub fn with_values(self, node: &str, values: &[f64]) -> Self {
        self.push_values(node, values);
        self
    }

    /// Replace a node's script with a single repeating value
    pub fn set_value(&self, node: &str, value: f64) {
        let mut state = self.state.lock().unwrap();
        state
            .scripts
            .insert(node.to_string(), VecDeque::from([value]));
        state.failures.remove(node);
    }

    /// Append values to a node's script
    pub fn push_values(&self, node: &str, values: &[f64]) {
        self.state
            .lock()
            .unwrap()
            .scripts
            .entry(node.to_string())
            .or_default()
            .extend(values.iter().copied());
    }

    /// Make reads of a node fail with `error`
    pub fn fail_node(&self, node: &str, error: DeviceError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(node.to_string(), error);
    }

    /// Mark an endpoint as unreachable or reachable
    pub fn set_unreachable(&self, endpoint: &str, unreachable: bool) {
        let mut state = self.state.lock().unwrap();
        if unreachable {
            state.unreachable.insert(endpoint.to_string());
        } else {
            state.unreachable.remove(endpoint);
        }
    }

    /// Delay applied to every read
    pub fn set_read_delay(&self, delay: Duration) {
        self.state.lock().unwrap().read_delay = delay;
    }

    /// Number of sessions opened
    pub fn connect_count(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    /// Number of sessions closed
    pub fn disconnect_count(&self) -> usize {
        self.state.lock().unwrap().disconnects
    }

    /// Number of reads of a node, counted when each read starts
    pub fn read_count(&self, node: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .reads
            .get(node)
            .copied()
            .unwrap_or(0)
    }
}

impl DeviceReader for MockReader {
    type Session = MockSession;

    fn connect(
        &self,
        endpoint: &str,
        _options: &ConnectOptions,
    ) -> Result<Self::Session, DeviceError> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable.contains(endpoint) {
            return Err(DeviceError::Connect {
                endpoint: endpoint.to_string(),
                reason: "mock endpoint unreachable".to_string(),
            });
        }
        state.connects += 1;

        Ok(MockSession {
            endpoint: endpoint.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

/// Session opened by [`MockReader`]
#[derive(Debug)]
pub struct MockSession {
    endpoint: String,
    state: Arc<Mutex<MockState>>,
}

impl DeviceSession for MockSession {
    fn read(&mut self, node: &str) -> Result<f64, DeviceError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            *state.reads.entry(node.to_string()).or_insert(0) += 1;
            state.read_delay
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let mut state = self.state.lock().unwrap();

        if state.unreachable.contains(&self.endpoint) {
            return Err(DeviceError::SessionLost(format!(
                "{} went away",
                self.endpoint
            )));
        }
        if let Some(error) = state.failures.get(node) {
            return Err(error.clone());
        }

        let script = state.scripts.get_mut(node).ok_or_else(|| DeviceError::Read {
            node: node.to_string(),
            reason: "unknown node".to_string(),
        })?;
        let value = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().copied()
        };
        value.ok_or_else(|| DeviceError::Read {
            node: node.to_string(),
            reason: "no value scripted".to_string(),
        })
    }

    fn disconnect(self) {
        self.state.lock().unwrap().disconnects += 1;
    }
}

/// Notifier that records deliveries in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<(String, String)>>,
    failing: HashSet<String>,
}

impl RecordingNotifier {
    /// Create a notifier that accepts every address
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: reject deliveries to `address`
    pub fn failing_for(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    /// Accepted deliveries as (address, message)
    pub fn deliveries(&self) -> Vec<(String, String)> {
        self.deliveries.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn deliver(&self, address: &str, message: &str) -> Result<(), DeliveryError> {
        if self.failing.contains(address) {
            return Err(DeliveryError::Rejected {
                address: address.to_string(),
                reason: "mock rejection".to_string(),
            });
        }
        self.deliveries
            .lock()
            .unwrap()
            .push((address.to_string(), message.to_string()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
