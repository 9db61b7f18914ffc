//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::alerts::{DispatchReport, TIMESTAMP_FORMAT};
use crate::cli::args::OutputFormat;
use crate::domain::{Direction, MachineSpec, Technician};
use crate::services::{MachineSnapshot, PlantSnapshot, Registry, VariableSnapshot};
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

fn format_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if unit.is_empty() => v.to_string(),
        Some(v) => format!("{} {}", v, unit),
        None => "--".to_string(),
    }
}

fn comparison(direction: Direction) -> &'static str {
    match direction {
        Direction::AtMost => "<=",
        Direction::AtLeast => ">=",
    }
}

impl TableDisplay for VariableSnapshot {
    fn to_table(&self) -> String {
        let mut line = format!(
            "  {} {}: {} [{}] (warning {} {}, critical {} {})",
            self.id,
            self.description,
            format_value(self.value, &self.unit),
            self.severity,
            comparison(self.direction),
            self.alert_threshold,
            comparison(self.direction),
            self.critical_threshold
        );
        if let Some(err) = &self.last_error {
            line.push_str(&format!("\n    Error: {}", err));
        }
        line
    }
}

impl TableDisplay for MachineSnapshot {
    fn to_table(&self) -> String {
        let mut output = format!(
            "[{}] {} ({}) - {}\n",
            self.id, self.name, self.endpoint, self.status
        );

        if let Some(poll) = self.last_poll {
            output.push_str(&format!("  Last Poll: {}\n", poll.format(TIMESTAMP_FORMAT)));
        }
        if let Some(err) = &self.last_error {
            output.push_str(&format!("  Error: {}\n", err));
        }
        for variable in &self.variables {
            output.push_str(&variable.to_table());
            output.push('\n');
        }

        output
    }

    fn to_compact(&self) -> String {
        format!("{}:{}:{}", self.id, self.status, self.worst_severity())
    }
}

impl TableDisplay for PlantSnapshot {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Snapshot: {}\nMachines: {}\n\n",
            self.taken_at.format(TIMESTAMP_FORMAT),
            self.machines.len()
        );

        for machine in &self.machines {
            output.push_str(&machine.to_table());
            output.push('\n');
        }

        output
    }

    fn to_compact(&self) -> String {
        self.machines
            .iter()
            .map(|m| m.to_compact())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Configured variable for display
#[derive(Debug, Clone, Serialize)]
pub struct VariableListEntry {
    pub id: String,
    pub description: String,
    pub unit: String,
    pub node: String,
    pub direction: Direction,
    pub alert_threshold: f64,
    pub critical_threshold: f64,
}

/// Configured machine for display
#[derive(Debug, Clone, Serialize)]
pub struct MachineListEntry {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub poll_interval_secs: Option<u64>,
    pub variables: Vec<VariableListEntry>,
    /// Responsible technicians as "name <address>"
    pub technicians: Vec<String>,
}

impl MachineListEntry {
    /// Build an entry with the technicians responsible for the machine
    pub fn new(spec: &MachineSpec, technicians: &[Technician]) -> Self {
        Self {
            id: spec.id.to_string(),
            name: spec.name.clone(),
            endpoint: spec.endpoint.clone(),
            poll_interval_secs: spec.poll_interval.map(|d| d.as_secs()),
            variables: spec
                .variables
                .iter()
                .map(|v| VariableListEntry {
                    id: v.id.to_string(),
                    description: v.description.clone(),
                    unit: v.unit.clone(),
                    node: v.node.clone(),
                    direction: v.thresholds.direction(),
                    alert_threshold: v.thresholds.alert(),
                    critical_threshold: v.thresholds.critical(),
                })
                .collect(),
            technicians: technicians
                .iter()
                .filter(|t| t.is_responsible_for(&spec.id))
                .map(|t| format!("{} <{}>", t.name, t.address))
                .collect(),
        }
    }
}

impl TableDisplay for MachineListEntry {
    fn to_table(&self) -> String {
        let mut output = format!("[{}] {} ({})\n", self.id, self.name, self.endpoint);

        if let Some(secs) = self.poll_interval_secs {
            output.push_str(&format!("  Poll Interval: {}s\n", secs));
        }
        for v in &self.variables {
            output.push_str(&format!(
                "  {} {} [{}] {}: warning {} {}, critical {} {}\n",
                v.id,
                v.description,
                v.node,
                v.unit,
                comparison(v.direction),
                v.alert_threshold,
                comparison(v.direction),
                v.critical_threshold
            ));
        }
        if self.technicians.is_empty() {
            output.push_str("  Technicians: none\n");
        } else {
            output.push_str(&format!("  Technicians: {}\n", self.technicians.join(", ")));
        }

        output
    }

    fn to_compact(&self) -> String {
        format!("{}:{}", self.id, self.name)
    }
}

/// Machine list for display
#[derive(Debug, Clone, Serialize)]
pub struct MachineList {
    pub machines: Vec<MachineListEntry>,
}

impl From<&Registry> for MachineList {
    fn from(registry: &Registry) -> Self {
        Self {
            machines: registry
                .machines()
                .map(|m| MachineListEntry::new(m, registry.technicians()))
                .collect(),
        }
    }
}

impl TableDisplay for MachineList {
    fn to_table(&self) -> String {
        let mut output = format!("Machines Configured: {}\n\n", self.machines.len());

        for machine in &self.machines {
            output.push_str(&machine.to_table());
            output.push('\n');
        }

        output
    }

    fn to_compact(&self) -> String {
        self.machines
            .iter()
            .map(|m| m.to_compact())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Reachability probe result
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub endpoint: String,
    pub reachable: bool,
    /// Resolved socket address when reachable
    pub address: Option<String>,
    pub error: Option<String>,
}

impl TableDisplay for ProbeResult {
    fn to_table(&self) -> String {
        match (&self.address, &self.error) {
            (Some(addr), _) if self.reachable => {
                format!("✓ {} is reachable ({})", self.endpoint, addr)
            }
            (_, Some(err)) => format!("✗ {} is not reachable: {}", self.endpoint, err),
            _ => format!(
                "{} {} is {}",
                if self.reachable { '✓' } else { '✗' },
                self.endpoint,
                if self.reachable { "reachable" } else { "not reachable" }
            ),
        }
    }

    fn to_compact(&self) -> String {
        format!("{}:{}", self.endpoint, self.reachable)
    }
}

/// Outcome of delivering an alert
#[derive(Debug, Clone, Serialize)]
pub struct DeliverySummary {
    pub message: String,
    pub delivered: Vec<String>,
    /// Failed deliveries as "address: reason"
    pub failed: Vec<String>,
}

impl From<&DispatchReport> for DeliverySummary {
    fn from(report: &DispatchReport) -> Self {
        Self {
            message: report.message.clone(),
            delivered: report.delivered.clone(),
            failed: report
                .failed
                .iter()
                .map(|(address, err)| format!("{}: {}", address, err))
                .collect(),
        }
    }
}

impl TableDisplay for DeliverySummary {
    fn to_table(&self) -> String {
        let mut output = format!("Delivered: {}\n", self.delivered.len());
        for address in &self.delivered {
            output.push_str(&format!("  ✓ {}\n", address));
        }
        for failure in &self.failed {
            output.push_str(&format!("  ✗ {}\n", failure));
        }
        if self.delivered.is_empty() && self.failed.is_empty() {
            output.push_str("  No technician is responsible for this machine\n");
        }
        output
    }

    fn to_compact(&self) -> String {
        format!(
            "delivered={} failed={}",
            self.delivered.len(),
            self.failed.len()
        )
    }
}

/// Generic message for display
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        if self.success {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::Severity;
    use crate::domain::{MachineId, MachineStatus, Thresholds, VariableId, VariableSpec};
    use chrono::Utc;

    fn lathe() -> MachineSpec {
        MachineSpec::new("M001", "CNC Lathe 1", "opc.tcp://10.0.0.1:4840").with_variable(
            VariableSpec::new(
                "V001",
                "Oil level",
                "%",
                "ns=2;i=1",
                Thresholds::new(20.0, 15.0, Direction::AtMost).unwrap(),
            ),
        )
    }

    #[test]
    fn test_snapshot_table() {
        let snapshot = PlantSnapshot {
            taken_at: Utc::now(),
            machines: vec![MachineSnapshot {
                id: MachineId::new("M001"),
                name: "CNC Lathe 1".to_string(),
                endpoint: "opc.tcp://10.0.0.1:4840".to_string(),
                status: MachineStatus::Online,
                last_poll: None,
                last_error: None,
                variables: vec![VariableSnapshot {
                    id: VariableId::new("V001"),
                    description: "Oil level".to_string(),
                    unit: "%".to_string(),
                    value: Some(18.0),
                    severity: Severity::Warning,
                    alert_threshold: 20.0,
                    critical_threshold: 15.0,
                    direction: Direction::AtMost,
                    last_error: None,
                }],
            }],
        };

        let output = snapshot.to_table();
        assert!(output.contains("CNC Lathe 1"));
        assert!(output.contains("18 %"));
        assert!(output.contains("WARNING"));
        assert_eq!(snapshot.to_compact(), "M001:online:WARNING");
    }

    #[test]
    fn test_machine_list_includes_technicians() {
        let technicians = vec![
            Technician::new("T001", "Joao Silva", "+5554999123456").responsible_for("M001"),
            Technician::new("T002", "Maria Santos", "+5554999234567").responsible_for("M002"),
        ];
        let entry = MachineListEntry::new(&lathe(), &technicians);

        assert_eq!(entry.technicians, vec!["Joao Silva <+5554999123456>"]);
        let output = entry.to_table();
        assert!(output.contains("warning <= 20"));
        assert!(output.contains("critical <= 15"));
    }

    #[test]
    fn test_missing_value_display() {
        assert_eq!(format_value(None, "%"), "--");
        assert_eq!(format_value(Some(4.5), ""), "4.5");
    }

    #[test]
    fn test_probe_result_display() {
        let result = ProbeResult {
            endpoint: "opc.tcp://10.0.0.1:4840".to_string(),
            reachable: false,
            address: None,
            error: Some("connection refused".to_string()),
        };
        assert!(result.to_table().starts_with('✗'));
        assert!(result.to_table().contains("connection refused"));
    }

    #[test]
    fn test_message_display() {
        let msg = Message {
            message: "Operation completed".to_string(),
            success: true,
        };

        assert!(msg.to_table().starts_with('✓'));
    }
}
