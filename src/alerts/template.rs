//! Alert message templates
//!
//! Templates use `{placeholder}` substitution. Supported placeholders:
//! `{machine_name}`, `{variable_name}`, `{current_value}`, `{unit}`,
//! `{threshold}` and `{timestamp}`. Timestamps are rendered as
//! `dd/mm/YYYY HH:MM:SS UTC`.

use super::types::AlertKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format used in rendered messages
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S UTC";

/// Values substituted into a template
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub machine_name: &'a str,
    pub variable_name: &'a str,
    pub current_value: f64,
    pub unit: &'a str,
    pub threshold: f64,
    pub timestamp: DateTime<Utc>,
}

/// Message templates keyed by alert kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertTemplates {
    /// Template for warning alerts
    pub warning: String,
    /// Template for critical alerts
    pub critical: String,
    /// Template for recovery notices
    pub recovery: String,
}

impl Default for AlertTemplates {
    fn default() -> Self {
        Self {
            warning: "WARNING - {machine_name}\n\
                      {variable_name}: {current_value} {unit} \
                      (alert threshold {threshold} {unit})\n\
                      {timestamp}"
                .to_string(),
            critical: "CRITICAL - {machine_name}\n\
                       {variable_name}: {current_value} {unit} \
                       (critical threshold {threshold} {unit})\n\
                       Immediate maintenance required.\n\
                       {timestamp}"
                .to_string(),
            recovery: "RECOVERED - {machine_name}\n\
                       {variable_name}: {current_value} {unit} is back within limits\n\
                       {timestamp}"
                .to_string(),
        }
    }
}

impl AlertTemplates {
    /// Template for an alert kind
    pub fn template_for(&self, kind: AlertKind) -> &str {
        match kind {
            AlertKind::Warning => &self.warning,
            AlertKind::Critical => &self.critical,
            AlertKind::Recovery => &self.recovery,
        }
    }

    /// Render the template for `kind`
    pub fn render(&self, kind: AlertKind, ctx: &TemplateContext<'_>) -> String {
        render_template(self.template_for(kind), ctx)
    }
}

impl TemplateContext<'_> {
    /// Rendered value of a placeholder, `None` for unknown keys
    fn value_of(&self, key: &str) -> Option<String> {
        let value = match key {
            "machine_name" => self.machine_name.to_string(),
            "variable_name" => self.variable_name.to_string(),
            "current_value" => self.current_value.to_string(),
            "unit" => self.unit.to_string(),
            "threshold" => self.threshold.to_string(),
            "timestamp" => self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// Substitute every placeholder in `template`
///
/// Substituted text is never rescanned, so values containing braces are
/// copied verbatim. Unknown placeholders are left as written.
pub fn render_template(template: &str, ctx: &TemplateContext<'_>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let tail = &rest[start..];

        let substitution = tail
            .find('}')
            .and_then(|end| ctx.value_of(&tail[1..end]).map(|value| (end, value)));
        match substitution {
            Some((end, value)) => {
                output.push_str(&value);
                rest = &tail[end + 1..];
            }
            None => {
                output.push('{');
                rest = &tail[1..];
            }
        }
    }

    output.push_str(rest);
    output
}
