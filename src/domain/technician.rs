//! Technician domain type

use super::machine::MachineId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Technician who receives alerts for the machines they are responsible for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    /// Technician identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Notification address (phone number, chat handle, ...)
    pub address: String,
    /// Machines this technician is responsible for
    pub machines: BTreeSet<MachineId>,
}

impl Technician {
    /// Create a technician with no machines
    pub fn new(id: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            machines: BTreeSet::new(),
        }
    }

    /// Builder: add a responsible machine
    pub fn responsible_for(mut self, machine: impl Into<String>) -> Self {
        self.machines.insert(MachineId::new(machine));
        self
    }

    /// Whether this technician is responsible for the machine
    pub fn is_responsible_for(&self, machine: &MachineId) -> bool {
        self.machines.contains(machine)
    }
}
