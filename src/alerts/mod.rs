//! Alert and notification system
//!
//! Threshold classification, edge-triggered alert tracking, routing to
//! technicians, and delivery through a notification transport.

mod notifier;
mod router;
mod template;
mod threshold;
mod tracker;
mod types;

pub use notifier::{AlertDispatcher, DispatchReport, Notifier, TerminalNotifier};
pub use router::{destinations_for, AlertRouter, RoutedAlert};
pub use template::{render_template, AlertTemplates, TemplateContext, TIMESTAMP_FORMAT};
pub use threshold::{classify, classify_raw, crossed_threshold};
pub use tracker::{AlertTracker, AlertTrackerConfig};
pub use types::{AlertEvent, AlertKind, AlertPayload, Severity};
