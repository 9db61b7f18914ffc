//! Machine domain types

use super::variable::{VariableId, VariableSpec};
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// Machine identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(String);

impl MachineId {
    /// Create a new machine identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MachineId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Connection lifecycle of a machine, as observed by its poller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    /// Registered, no connection attempt yet
    #[default]
    Configured,
    /// Connection attempt in progress
    Connecting,
    /// Last connection attempt succeeded
    Online,
    /// Last connection attempt failed or the session dropped
    Offline,
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured => write!(f, "configured"),
            Self::Connecting => write!(f, "connecting"),
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Configured machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineSpec {
    /// Stable identifier
    pub id: MachineId,
    /// Display name
    pub name: String,
    /// Protocol endpoint address
    pub endpoint: String,
    /// Per-machine poll interval; falls back to the engine default
    pub poll_interval: Option<Duration>,
    /// Variables in polling order
    pub variables: Vec<VariableSpec>,
}

impl MachineSpec {
    /// Create a machine with no variables
    pub fn new(id: impl Into<String>, name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: MachineId::new(id),
            name: name.into(),
            endpoint: endpoint.into(),
            poll_interval: None,
            variables: Vec::new(),
        }
    }

    /// Builder: add a variable
    pub fn with_variable(mut self, variable: VariableSpec) -> Self {
        self.variables.push(variable);
        self
    }

    /// Builder: set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Look up a variable by id
    pub fn variable(&self, id: &VariableId) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| &v.id == id)
    }

    /// Check required fields and variable id uniqueness
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::EmptyField("id"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::EmptyField("name"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(DomainError::EmptyField("endpoint"));
        }
        if self.poll_interval == Some(Duration::ZERO) {
            return Err(DomainError::ZeroInterval);
        }

        let mut seen = HashSet::new();
        for variable in &self.variables {
            if variable.id.as_str().trim().is_empty() {
                return Err(DomainError::EmptyField("variable id"));
            }
            if variable.node.trim().is_empty() {
                return Err(DomainError::EmptyField("nodeRef"));
            }
            if !seen.insert(&variable.id) {
                return Err(DomainError::DuplicateVariable(variable.id.to_string()));
            }
        }

        Ok(())
    }
}
