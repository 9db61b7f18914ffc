//! Alert state tracker
//!
//! Turns per-variable classifications into edge-triggered alert events.
//! Each (machine, variable) pair starts in `Ok` and only emits on a rising
//! edge into warning or critical; sustained readings never re-emit.

use super::threshold::{classify, crossed_threshold};
use super::types::{AlertEvent, AlertKind, Severity};
use crate::domain::{MachineId, VariableId, VariableSpec};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Alert tracker configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertTrackerConfig {
    /// Emit a `Recovery` event when a variable returns to ok
    pub recovery_notices: bool,
}

/// Per-(machine, variable) alert state machine
#[derive(Debug, Default)]
pub struct AlertTracker {
    states: HashMap<(MachineId, VariableId), Severity>,
    config: AlertTrackerConfig,
}

impl AlertTracker {
    /// Create a new tracker
    pub fn new(config: AlertTrackerConfig) -> Self {
        Self {
            states: HashMap::new(),
            config,
        }
    }

    /// Current state of a variable; untracked variables are `Ok`
    pub fn state(&self, machine_id: &MachineId, variable_id: &VariableId) -> Severity {
        self.states
            .get(&(machine_id.clone(), variable_id.clone()))
            .copied()
            .unwrap_or_default()
    }

    /// Classify a reading and feed it through the state machine
    pub fn observe(
        &mut self,
        machine_id: &MachineId,
        variable: &VariableSpec,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> (Severity, Option<AlertEvent>) {
        let severity = classify(value, &variable.thresholds);
        let event = self.record(machine_id, variable, severity, value, timestamp);
        (severity, event)
    }

    /// Record a classification, returning an event on a transition edge
    pub fn record(
        &mut self,
        machine_id: &MachineId,
        variable: &VariableSpec,
        severity: Severity,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Option<AlertEvent> {
        let key = (machine_id.clone(), variable.id.clone());
        let previous = self.states.insert(key, severity).unwrap_or_default();

        let kind = match (previous, severity) {
            (Severity::Critical, Severity::Critical) => None,
            (_, Severity::Critical) => Some(AlertKind::Critical),
            (Severity::Ok, Severity::Warning) => Some(AlertKind::Warning),
            // Sustained warning, or de-escalation from critical
            (_, Severity::Warning) => None,
            (Severity::Ok, Severity::Ok) => None,
            (_, Severity::Ok) => {
                log::info!(
                    "{}/{} recovered from {} (value {})",
                    machine_id,
                    variable.id,
                    previous,
                    value
                );
                self.config.recovery_notices.then_some(AlertKind::Recovery)
            }
        }?;

        let threshold = crossed_threshold(severity, &variable.thresholds)
            .unwrap_or_else(|| variable.thresholds.alert());

        Some(AlertEvent {
            machine_id: machine_id.clone(),
            variable_id: variable.id.clone(),
            kind,
            value,
            threshold,
            timestamp,
        })
    }

    /// Forget every variable of a machine, returning how many were dropped
    pub fn reset_machine(&mut self, machine_id: &MachineId) -> usize {
        let before = self.states.len();
        self.states.retain(|(machine, _), _| machine != machine_id);
        before - self.states.len()
    }

    /// Keep only the variables of a machine accepted by `keep`
    pub fn retain_variables<F>(&mut self, machine_id: &MachineId, mut keep: F)
    where
        F: FnMut(&VariableId) -> bool,
    {
        self.states.retain(|(machine, variable), _| machine != machine_id || keep(variable));
    }

    /// Number of tracked variables
    pub fn tracked_count(&self) -> usize {
        self.states.len()
    }
}
