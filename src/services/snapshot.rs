//! Observable machine state and read-only snapshots

use crate::alerts::Severity;
use crate::domain::{Direction, MachineId, MachineSpec, MachineStatus, VariableId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Latest observation of one variable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableState {
    /// Last successfully read value; `None` after a failed read
    pub value: Option<f64>,
    /// Current alert state
    pub severity: Severity,
    /// Error from the last read, if it failed
    pub last_error: Option<String>,
}

/// State of one machine, written only by its poller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineState {
    pub status: MachineStatus,
    pub last_poll: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub variables: HashMap<VariableId, VariableState>,
}

impl MachineState {
    /// Drop all values, keeping alert states
    pub fn clear_values(&mut self) {
        for variable in self.variables.values_mut() {
            variable.value = None;
        }
    }
}

/// Snapshot of one variable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSnapshot {
    pub id: VariableId,
    pub description: String,
    pub unit: String,
    pub value: Option<f64>,
    pub severity: Severity,
    pub alert_threshold: f64,
    pub critical_threshold: f64,
    pub direction: Direction,
    pub last_error: Option<String>,
}

/// Snapshot of one machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineSnapshot {
    pub id: MachineId,
    pub name: String,
    pub endpoint: String,
    pub status: MachineStatus,
    pub last_poll: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub variables: Vec<VariableSnapshot>,
}

impl MachineSnapshot {
    /// Combine a spec with its observed state, in spec variable order
    pub fn build(spec: &MachineSpec, state: &MachineState) -> Self {
        let variables = spec
            .variables
            .iter()
            .map(|v| {
                let observed = state.variables.get(&v.id).cloned().unwrap_or_default();
                VariableSnapshot {
                    id: v.id.clone(),
                    description: v.description.clone(),
                    unit: v.unit.clone(),
                    value: observed.value,
                    severity: observed.severity,
                    alert_threshold: v.thresholds.alert(),
                    critical_threshold: v.thresholds.critical(),
                    direction: v.thresholds.direction(),
                    last_error: observed.last_error,
                }
            })
            .collect();

        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            endpoint: spec.endpoint.clone(),
            status: state.status,
            last_poll: state.last_poll,
            last_error: state.last_error.clone(),
            variables,
        }
    }

    /// Highest severity across variables
    pub fn worst_severity(&self) -> Severity {
        self.variables
            .iter()
            .map(|v| v.severity)
            .max()
            .unwrap_or_default()
    }
}

/// Immutable copy of every machine's state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantSnapshot {
    pub taken_at: DateTime<Utc>,
    pub machines: Vec<MachineSnapshot>,
}

impl PlantSnapshot {
    /// Look up a machine
    pub fn machine(&self, id: &MachineId) -> Option<&MachineSnapshot> {
        self.machines.iter().find(|m| &m.id == id)
    }

    /// Whether a machine is present
    pub fn contains(&self, id: &MachineId) -> bool {
        self.machine(id).is_some()
    }

    /// Count machines in a status
    pub fn count_status(&self, status: MachineStatus) -> usize {
        self.machines.iter().filter(|m| m.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Thresholds, VariableSpec};

    fn spec() -> MachineSpec {
        let t = Thresholds::new(20.0, 15.0, Direction::AtMost).unwrap();
        MachineSpec::new("M001", "CNC Lathe 1", "opc.tcp://10.0.0.1:4840")
            .with_variable(VariableSpec::new("V001", "Oil level", "%", "ns=2;i=1", t))
            .with_variable(VariableSpec::new("V002", "Coolant level", "%", "ns=2;i=2", t))
    }

    #[test]
    fn test_build_defaults_missing_variables() {
        let snapshot = MachineSnapshot::build(&spec(), &MachineState::default());
        assert_eq!(snapshot.status, MachineStatus::Configured);
        assert_eq!(snapshot.variables.len(), 2);
        assert!(snapshot.variables.iter().all(|v| v.value.is_none()));
        assert_eq!(snapshot.worst_severity(), Severity::Ok);
    }

    #[test]
    fn test_build_uses_observed_state() {
        let mut state = MachineState {
            status: MachineStatus::Online,
            ..MachineState::default()
        };
        state.variables.insert(
            VariableId::new("V002"),
            VariableState {
                value: Some(12.0),
                severity: Severity::Critical,
                last_error: None,
            },
        );

        let snapshot = MachineSnapshot::build(&spec(), &state);
        assert_eq!(snapshot.variables[0].value, None);
        assert_eq!(snapshot.variables[1].value, Some(12.0));
        assert_eq!(snapshot.worst_severity(), Severity::Critical);
    }

    #[test]
    fn test_clear_values_keeps_severity() {
        let mut state = MachineState::default();
        state.variables.insert(
            VariableId::new("V001"),
            VariableState {
                value: Some(10.0),
                severity: Severity::Critical,
                last_error: None,
            },
        );

        state.clear_values();
        let v = &state.variables[&VariableId::new("V001")];
        assert_eq!(v.value, None);
        assert_eq!(v.severity, Severity::Critical);
    }
}
