//! Machine and technician registry
//!
//! Machine specs are stored behind `Arc` so readers can take a consistent
//! copy of a machine and release the lock before doing any I/O.

use crate::domain::{MachineId, MachineSpec, Technician};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of configured machines and technicians
#[derive(Debug, Clone, Default)]
pub struct Registry {
    machines: BTreeMap<MachineId, Arc<MachineSpec>>,
    technicians: Vec<Technician>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a machine
    pub fn machine(&self, id: &MachineId) -> Option<&MachineSpec> {
        self.machines.get(id).map(Arc::as_ref)
    }

    /// Shared handle to a machine spec
    pub fn machine_arc(&self, id: &MachineId) -> Option<Arc<MachineSpec>> {
        self.machines.get(id).cloned()
    }

    /// All machines in id order
    pub fn machines(&self) -> impl Iterator<Item = &Arc<MachineSpec>> {
        self.machines.values()
    }

    /// Whether a machine is registered
    pub fn contains(&self, id: &MachineId) -> bool {
        self.machines.contains_key(id)
    }

    /// Id of the machine using `endpoint`, if any
    pub fn find_by_endpoint(&self, endpoint: &str) -> Option<&MachineId> {
        let endpoint = endpoint.trim();
        self.machines
            .values()
            .find(|m| m.endpoint.trim() == endpoint)
            .map(|m| &m.id)
    }

    /// Insert or replace a machine, returning the previous spec
    pub fn insert(&mut self, spec: MachineSpec) -> Option<Arc<MachineSpec>> {
        self.machines.insert(spec.id.clone(), Arc::new(spec))
    }

    /// Remove a machine
    pub fn remove(&mut self, id: &MachineId) -> Option<Arc<MachineSpec>> {
        self.machines.remove(id)
    }

    /// First unused id of the form `M001`, `M002`, ...
    pub fn next_id(&self) -> MachineId {
        (1..)
            .map(|n| MachineId::new(format!("M{:03}", n)))
            .find(|id| !self.machines.contains_key(id))
            .unwrap_or_else(|| MachineId::new(format!("M{}", self.machines.len() + 1)))
    }

    /// Technicians in configuration order
    pub fn technicians(&self) -> &[Technician] {
        &self.technicians
    }

    /// Replace the technician list
    pub fn set_technicians(&mut self, technicians: Vec<Technician>) {
        self.technicians = technicians;
    }

    /// Number of machines
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    /// Whether no machines are registered
    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}
