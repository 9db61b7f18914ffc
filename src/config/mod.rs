//! Configuration system
//!
//! Handles config file parsing (TOML, or JSON for `.json` files), machine
//! record validation and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::alerts::{AlertTemplates, AlertTrackerConfig};
use crate::device::ConnectOptions;
use crate::domain::{Direction, MachineId, MachineSpec, Technician, Thresholds, VariableSpec};
use crate::error::{ConfigError, DomainError};
use crate::services::{PollerSettings, Registry, SupervisorSettings};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine settings
    pub general: GeneralConfig,
    /// Alert message templates
    pub templates: AlertTemplates,
    /// Machine records
    pub machines: Vec<MachineConfig>,
    /// Technicians and their machines
    pub technicians: Vec<TechnicianConfig>,
}

impl Config {
    /// Validate settings and every machine record
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.general.validate()?;
        self.registry().map(|_| ())
    }

    /// Build a registry from the machine and technician records
    ///
    /// Records without an id get the next free `Mxxx` id. Ids and endpoints
    /// must be unique.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        let mut registry = Registry::new();

        // Reserve explicit ids first so generated ones never collide
        let mut taken: HashSet<MachineId> = self
            .machines
            .iter()
            .filter_map(MachineConfig::explicit_id)
            .collect();

        for record in &self.machines {
            let id = match record.explicit_id() {
                Some(id) => id,
                None => {
                    let id = next_free_id(&taken);
                    taken.insert(id.clone());
                    id
                }
            };

            if registry.contains(&id) {
                return Err(ConfigError::DuplicateId(id.to_string()));
            }
            let spec = record.to_spec(id)?;
            if let Some(owner) = registry.find_by_endpoint(&spec.endpoint) {
                return Err(ConfigError::EndpointInUse {
                    endpoint: spec.endpoint.clone(),
                    owner: owner.to_string(),
                });
            }
            registry.insert(spec);
        }

        registry.set_technicians(
            self.technicians
                .iter()
                .map(TechnicianConfig::to_technician)
                .collect(),
        );
        Ok(registry)
    }
}

/// First `Mxxx` id not in `taken`
fn next_free_id(taken: &HashSet<MachineId>) -> MachineId {
    (1..=taken.len() + 1)
        .map(|n| MachineId::new(format!("M{:03}", n)))
        .find(|id| !taken.contains(id))
        .unwrap_or_else(|| MachineId::new(format!("M{:03}", taken.len() + 1)))
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
    /// Default poll interval in seconds
    pub poll_interval_secs: u64,
    /// Reconnect backoff ceiling in seconds
    pub max_backoff_secs: u64,
    /// Session connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Variable read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// How long shutdown waits for each poller in milliseconds
    pub shutdown_grace_ms: u64,
    /// Notify technicians when a variable returns to ok
    pub recovery_notices: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            poll_interval_secs: 30,
            max_backoff_secs: 300,
            connect_timeout_ms: 3000,
            read_timeout_ms: 5000,
            shutdown_grace_ms: 2000,
            recovery_notices: false,
        }
    }
}

impl GeneralConfig {
    /// Reject zero intervals and timeouts
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("general.poll_interval_secs", self.poll_interval_secs),
            ("general.connect_timeout_ms", self.connect_timeout_ms),
            ("general.read_timeout_ms", self.read_timeout_ms),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Session timeouts
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }

    /// Settings for every machine poller
    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            default_interval: Duration::from_secs(self.poll_interval_secs),
            max_backoff: Duration::from_secs(self.max_backoff_secs),
            connect: self.connect_options(),
            tracker: AlertTrackerConfig {
                recovery_notices: self.recovery_notices,
            },
        }
    }

    /// Settings for the supervisor
    pub fn supervisor_settings(&self) -> SupervisorSettings {
        SupervisorSettings {
            poller: self.poller_settings(),
            shutdown_grace: Duration::from_millis(self.shutdown_grace_ms),
            probe_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }
}

/// Machine record as stored in config files and passed to `add_machine`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineConfig {
    /// Stable id; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Protocol endpoint address
    #[serde(default, alias = "opc_url")]
    pub endpoint: String,
    /// Per-machine poll interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,
    /// Variables in polling order
    #[serde(default)]
    pub variables: Vec<VariableConfig>,
}

impl MachineConfig {
    /// Create a record without an id
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Builder: set the id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder: add a variable
    pub fn with_variable(mut self, variable: VariableConfig) -> Self {
        self.variables.push(variable);
        self
    }

    /// The id if one was given and is not blank
    pub fn explicit_id(&self) -> Option<MachineId> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(MachineId::new)
    }

    /// Build a validated machine spec under `id`
    pub fn to_spec(&self, id: MachineId) -> Result<MachineSpec, ConfigError> {
        let label = if self.name.trim().is_empty() {
            id.to_string()
        } else {
            self.name.clone()
        };
        let invalid = |source: DomainError| ConfigError::InvalidMachine {
            machine: label.clone(),
            source,
        };

        let mut spec = MachineSpec::new(id.as_str(), self.name.trim(), self.endpoint.trim());
        spec.poll_interval = self.poll_interval_secs.map(Duration::from_secs);
        for variable in &self.variables {
            spec.variables.push(variable.to_spec().map_err(invalid)?);
        }
        spec.validate().map_err(invalid)?;
        Ok(spec)
    }
}

/// Variable record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableConfig {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    pub node_ref: String,
    pub alert_threshold: f64,
    pub critical_threshold: f64,
    pub direction: Direction,
}

impl VariableConfig {
    /// Create a variable record
    pub fn new(
        id: impl Into<String>,
        node_ref: impl Into<String>,
        alert_threshold: f64,
        critical_threshold: f64,
        direction: Direction,
    ) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            unit: String::new(),
            node_ref: node_ref.into(),
            alert_threshold,
            critical_threshold,
            direction,
        }
    }

    /// Builder: set description and unit
    pub fn described(mut self, description: impl Into<String>, unit: impl Into<String>) -> Self {
        self.description = description.into();
        self.unit = unit.into();
        self
    }

    /// Build a variable spec with validated thresholds
    pub fn to_spec(&self) -> Result<VariableSpec, DomainError> {
        let thresholds = Thresholds::new(
            self.alert_threshold,
            self.critical_threshold,
            self.direction,
        )?;
        Ok(VariableSpec::new(
            self.id.trim(),
            self.description.as_str(),
            self.unit.as_str(),
            self.node_ref.trim(),
            thresholds,
        ))
    }
}

/// Partial machine update; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachinePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "opc_url")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
    /// Replaces the whole variable list when present
    #[serde(default)]
    pub variables: Option<Vec<VariableConfig>>,
}

impl MachinePatch {
    /// Builder: rename
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: move to another endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Builder: replace the variables
    pub fn variables(mut self, variables: Vec<VariableConfig>) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Merge into `current`, returning the validated result
    pub fn apply(&self, current: &MachineSpec) -> Result<MachineSpec, ConfigError> {
        let invalid = |source: DomainError| ConfigError::InvalidMachine {
            machine: current.id.to_string(),
            source,
        };

        let mut spec = current.clone();
        if let Some(name) = &self.name {
            spec.name = name.trim().to_string();
        }
        if let Some(endpoint) = &self.endpoint {
            spec.endpoint = endpoint.trim().to_string();
        }
        if let Some(secs) = self.poll_interval_secs {
            spec.poll_interval = Some(Duration::from_secs(secs));
        }
        if let Some(variables) = &self.variables {
            spec.variables = variables
                .iter()
                .map(VariableConfig::to_spec)
                .collect::<Result<Vec<_>, _>>()
                .map_err(invalid)?;
        }
        spec.validate().map_err(invalid)?;
        Ok(spec)
    }
}

/// Technician record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianConfig {
    pub id: String,
    pub name: String,
    /// Notification address
    #[serde(alias = "whatsapp")]
    pub address: String,
    #[serde(default)]
    pub responsible_machines: Vec<String>,
}

impl TechnicianConfig {
    /// Convert to the domain type
    pub fn to_technician(&self) -> Technician {
        self.responsible_machines.iter().fold(
            Technician::new(self.id.as_str(), self.name.as_str(), self.address.as_str()),
            |tech, machine| tech.responsible_for(machine.trim()),
        )
    }
}
