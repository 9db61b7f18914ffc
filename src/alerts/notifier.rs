//! Alert notification system
//!
//! Provides the notification transport seam and the dispatcher that hands
//! routed alerts to it.

use super::router::{AlertRouter, RoutedAlert};
use super::types::{AlertEvent, AlertKind};
use crate::error::DeliveryError;
use crate::services::Registry;
use std::io::{self, Write};
use std::sync::Arc;

/// Notification transport
pub trait Notifier: Send + Sync {
    /// Deliver a message to one address
    fn deliver(&self, address: &str, message: &str) -> Result<(), DeliveryError>;

    /// Transport name for identification
    fn name(&self) -> &str;
}

/// Terminal/console notifier
///
/// Prints each delivery to stdout/stderr, standing in for a messaging provider.
pub struct TerminalNotifier {
    /// Use stderr instead of stdout
    use_stderr: bool,
    /// Use colors (ANSI escape codes)
    use_colors: bool,
}

impl TerminalNotifier {
    /// Create a new terminal notifier writing to stdout
    pub fn new() -> Self {
        Self {
            use_stderr: false,
            use_colors: Self::supports_color(),
        }
    }

    /// Create a notifier that uses stderr
    pub fn stderr() -> Self {
        Self {
            use_stderr: true,
            use_colors: Self::supports_color(),
        }
    }

    /// Create a notifier without colors
    pub fn no_color() -> Self {
        Self {
            use_stderr: false,
            use_colors: false,
        }
    }

    /// Check if terminal supports colors
    fn supports_color() -> bool {
        std::env::var("TERM")
            .map(|term| term != "dumb")
            .unwrap_or(false)
    }

    /// Format a delivery for display
    fn format_delivery(&self, address: &str, message: &str) -> String {
        let header = if self.use_colors {
            format!("\x1b[36m-> {}\x1b[0m", address)
        } else {
            format!("-> {}", address)
        };
        format!("{}\n{}\n{}", header, message, "-".repeat(50))
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TerminalNotifier {
    fn deliver(&self, address: &str, message: &str) -> Result<(), DeliveryError> {
        let text = self.format_delivery(address, message);

        if self.use_stderr {
            let stderr = io::stderr();
            let mut handle = stderr.lock();
            writeln!(handle, "{}", text)?;
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", text)?;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "terminal"
    }
}

/// Outcome of delivering one routed alert
#[derive(Debug)]
pub struct DispatchReport {
    /// Rendered message
    pub message: String,
    /// Addresses the transport accepted
    pub delivered: Vec<String>,
    /// Addresses the transport rejected
    pub failed: Vec<(String, DeliveryError)>,
}

impl DispatchReport {
    /// Whether every destination was delivered
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Routes alert events and hands them to the notification transport
pub struct AlertDispatcher {
    router: AlertRouter,
    notifier: Arc<dyn Notifier>,
}

impl AlertDispatcher {
    /// Create a new dispatcher
    pub fn new(router: AlertRouter, notifier: Arc<dyn Notifier>) -> Self {
        Self { router, notifier }
    }

    /// Get the router
    pub fn router(&self) -> &AlertRouter {
        &self.router
    }

    /// Route an event through the registry and deliver it
    pub fn dispatch(&self, event: &AlertEvent, registry: &Registry) -> DispatchReport {
        let routed = self.router.route(event, registry);
        self.deliver(&routed)
    }

    /// Deliver an already routed alert to each destination
    ///
    /// Delivery failures are logged and collected, never propagated.
    pub fn deliver(&self, routed: &RoutedAlert) -> DispatchReport {
        log_event(&routed.event);

        let mut report = DispatchReport {
            message: routed.message.clone(),
            delivered: Vec::new(),
            failed: Vec::new(),
        };

        if routed.destinations.is_empty() {
            log::info!(
                "No technician responsible for machine {}; alert not delivered",
                routed.event.machine_id
            );
            return report;
        }

        for address in &routed.destinations {
            match self.notifier.deliver(address, &routed.message) {
                Ok(()) => {
                    log::debug!("Alert delivered to {} via {}", address, self.notifier.name());
                    report.delivered.push(address.clone());
                }
                Err(e) => {
                    log::warn!(
                        "Failed to notify {} via {}: {}",
                        address,
                        self.notifier.name(),
                        e
                    );
                    report.failed.push((address.clone(), e));
                }
            }
        }

        report
    }
}

fn log_event(event: &AlertEvent) {
    match event.kind {
        AlertKind::Critical => log::error!("Alert: {}", event),
        AlertKind::Warning => log::warn!("Alert: {}", event),
        AlertKind::Recovery => log::info!("Recovery: {}", event),
    }
}
