//! Simulated device source
//!
//! Produces deterministic waveforms per node so a plant configuration can be
//! exercised end to end without real hardware.

use super::traits::{ConnectOptions, DeviceReader, DeviceSession};
use crate::domain::{Direction, MachineSpec, Thresholds};
use crate::error::DeviceError;
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Waveform for one simulated node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalProfile {
    /// Mean value
    pub center: f64,
    /// Peak deviation from the mean
    pub amplitude: f64,
    /// Time for one full oscillation
    pub period: Duration,
    /// Phase offset in radians
    pub phase: f64,
}

impl SignalProfile {
    /// Profile that sits on the safe side of the alert threshold and
    /// periodically swings past the critical threshold
    pub fn around(thresholds: &Thresholds) -> Self {
        let span = (thresholds.alert() - thresholds.critical())
            .abs()
            .max(thresholds.alert().abs() * 0.1)
            .max(1.0);

        let center = match thresholds.direction() {
            Direction::AtMost => thresholds.alert() + span,
            Direction::AtLeast => thresholds.alert() - span,
        };

        Self {
            center,
            amplitude: span * 2.5,
            period: Duration::from_secs(120),
            phase: 0.0,
        }
    }

    /// Builder: set the phase offset
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    /// Value of the waveform after `elapsed`, rounded to two decimals
    pub fn value_at(&self, elapsed: Duration) -> f64 {
        let period = self.period.as_secs_f64().max(f64::EPSILON);
        let angle = TAU * elapsed.as_secs_f64() / period + self.phase;
        let value = self.center + self.amplitude * angle.sin();
        (value * 100.0).round() / 100.0
    }
}

#[derive(Debug, Default)]
struct SimState {
    profiles: HashMap<String, SignalProfile>,
    unreachable: HashSet<String>,
}

/// Simulated device reader
#[derive(Debug, Clone)]
pub struct SimulatedReader {
    state: Arc<RwLock<SimState>>,
    started: Instant,
}

impl SimulatedReader {
    /// Create a reader with no nodes
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SimState::default())),
            started: Instant::now(),
        }
    }

    /// Create a reader with a profile for every variable of every machine
    ///
    /// Phases are staggered so variables do not cross thresholds together.
    pub fn for_machines<'a>(machines: impl IntoIterator<Item = &'a MachineSpec>) -> Self {
        let reader = Self::new();
        let mut index = 0usize;
        for machine in machines {
            for variable in &machine.variables {
                let phase = (index as f64 * 0.9) % TAU;
                reader.set_profile(
                    &variable.node,
                    SignalProfile::around(&variable.thresholds).with_phase(phase),
                );
                index += 1;
            }
        }
        reader
    }

    /// Builder: add a node profile
    pub fn with_profile(self, node: &str, profile: SignalProfile) -> Self {
        self.set_profile(node, profile);
        self
    }

    /// Set or replace a node profile
    pub fn set_profile(&self, node: &str, profile: SignalProfile) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .profiles
            .insert(node.to_string(), profile);
    }

    /// Mark an endpoint as unreachable or reachable
    pub fn set_unreachable(&self, endpoint: &str, unreachable: bool) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if unreachable {
            state.unreachable.insert(endpoint.to_string());
        } else {
            state.unreachable.remove(endpoint);
        }
    }
}

impl Default for SimulatedReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceReader for SimulatedReader {
    type Session = SimulatedSession;

    fn connect(
        &self,
        endpoint: &str,
        _options: &ConnectOptions,
    ) -> Result<Self::Session, DeviceError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.unreachable.contains(endpoint) {
            return Err(DeviceError::Connect {
                endpoint: endpoint.to_string(),
                reason: "simulated endpoint unreachable".to_string(),
            });
        }

        Ok(SimulatedSession {
            endpoint: endpoint.to_string(),
            state: Arc::clone(&self.state),
            started: self.started,
        })
    }
}

/// Session to a simulated machine
#[derive(Debug)]
pub struct SimulatedSession {
    endpoint: String,
    state: Arc<RwLock<SimState>>,
    started: Instant,
}

impl DeviceSession for SimulatedSession {
    fn read(&mut self, node: &str) -> Result<f64, DeviceError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.unreachable.contains(&self.endpoint) {
            return Err(DeviceError::SessionLost(format!(
                "{} stopped responding",
                self.endpoint
            )));
        }

        state
            .profiles
            .get(node)
            .map(|profile| profile.value_at(self.started.elapsed()))
            .ok_or_else(|| DeviceError::Read {
                node: node.to_string(),
                reason: "unknown node".to_string(),
            })
    }
}
