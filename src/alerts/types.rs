//! Alert system domain types
//!
//! Defines reading classifications and the immutable alert events produced on
//! classification edges.

use crate::domain::{MachineId, VariableId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a single reading
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Within limits
    #[default]
    Ok,
    /// Alert threshold breached
    Warning,
    /// Critical threshold breached
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Kind of alert event
///
/// `Recovery` is only produced when recovery notices are enabled and is kept
/// distinct so routing can treat it differently from real alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Rising edge from ok into warning
    Warning,
    /// Rising edge or escalation into critical
    Critical,
    /// Return to ok from warning or critical
    Recovery,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
            Self::Recovery => write!(f, "recovery"),
        }
    }
}

/// Immutable alert event emitted on a state transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Machine the reading came from
    pub machine_id: MachineId,
    /// Variable that was read
    pub variable_id: VariableId,
    /// Event kind
    pub kind: AlertKind,
    /// Reading that caused the transition
    pub value: f64,
    /// Threshold that was crossed
    pub threshold: f64,
    /// Time of the reading
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}: {} (threshold {})",
            self.kind, self.machine_id, self.variable_id, self.value, self.threshold
        )
    }
}

/// Alert payload reported by an external detector
///
/// When `destination` is present the payload bypasses technician lookup and is
/// delivered to that address only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    pub machine_id: MachineId,
    pub variable_id: VariableId,
    pub severity: AlertKind,
    pub value: f64,
    pub threshold: f64,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub destination: Option<String>,
}

impl AlertPayload {
    /// Convert into an alert event, dropping the destination override
    pub fn to_event(&self) -> AlertEvent {
        AlertEvent {
            machine_id: self.machine_id.clone(),
            variable_id: self.variable_id.clone(),
            kind: self.severity,
            value: self.value,
            threshold: self.threshold,
            timestamp: self.timestamp,
        }
    }
}
