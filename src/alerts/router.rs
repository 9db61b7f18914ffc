//! Alert routing
//!
//! Resolves an alert event to the technicians responsible for its machine and
//! renders the notification message. Routing has no side effects.

use super::template::{AlertTemplates, TemplateContext};
use super::types::AlertEvent;
use crate::domain::{MachineId, Technician};
use crate::services::Registry;
use std::collections::BTreeSet;

/// Rendered alert with its destinations
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedAlert {
    /// Event being delivered
    pub event: AlertEvent,
    /// Rendered message
    pub message: String,
    /// Notification addresses; may be empty
    pub destinations: BTreeSet<String>,
}

/// Alert router
#[derive(Debug, Clone, Default)]
pub struct AlertRouter {
    templates: AlertTemplates,
}

impl AlertRouter {
    /// Create a router with the given templates
    pub fn new(templates: AlertTemplates) -> Self {
        Self { templates }
    }

    /// Get the configured templates
    pub fn templates(&self) -> &AlertTemplates {
        &self.templates
    }

    /// Route an event to every technician responsible for its machine
    pub fn route(&self, event: &AlertEvent, registry: &Registry) -> RoutedAlert {
        RoutedAlert {
            event: event.clone(),
            message: self.render(event, registry),
            destinations: destinations_for(&event.machine_id, registry.technicians()),
        }
    }

    /// Render an event for a single fixed destination, skipping technician lookup
    pub fn route_to(&self, event: &AlertEvent, registry: &Registry, address: &str) -> RoutedAlert {
        RoutedAlert {
            event: event.clone(),
            message: self.render(event, registry),
            destinations: BTreeSet::from([address.to_string()]),
        }
    }

    /// Render the message for an event
    ///
    /// Unknown machines or variables render with their raw ids.
    pub fn render(&self, event: &AlertEvent, registry: &Registry) -> String {
        let machine = registry.machine(&event.machine_id);
        let variable = machine.and_then(|m| m.variable(&event.variable_id));

        let ctx = TemplateContext {
            machine_name: machine
                .map(|m| m.name.as_str())
                .unwrap_or(event.machine_id.as_str()),
            variable_name: variable
                .map(|v| v.description.as_str())
                .unwrap_or(event.variable_id.as_str()),
            current_value: event.value,
            unit: variable.map(|v| v.unit.as_str()).unwrap_or(""),
            threshold: event.threshold,
            timestamp: event.timestamp,
        };

        self.templates.render(event.kind, &ctx)
    }
}

/// Addresses of all technicians responsible for a machine
pub fn destinations_for(machine_id: &MachineId, technicians: &[Technician]) -> BTreeSet<String> {
    technicians
        .iter()
        .filter(|t| t.is_responsible_for(machine_id))
        .map(|t| t.address.clone())
        .collect()
}
