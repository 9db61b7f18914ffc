//! Threshold evaluation
//!
//! Pure classification of a reading against a variable's thresholds.

use super::types::Severity;
use crate::domain::{Direction, Thresholds};

/// Classify a reading
///
/// The critical threshold is checked first, so a reading that breaches both
/// thresholds is critical. The caller must only pass successfully read values.
pub fn classify(value: f64, thresholds: &Thresholds) -> Severity {
    classify_raw(
        value,
        thresholds.alert(),
        thresholds.critical(),
        thresholds.direction(),
    )
}

/// Classify a reading against raw threshold values
pub fn classify_raw(value: f64, alert: f64, critical: f64, direction: Direction) -> Severity {
    if direction.breaches(value, critical) {
        Severity::Critical
    } else if direction.breaches(value, alert) {
        Severity::Warning
    } else {
        Severity::Ok
    }
}

/// Threshold crossed by a classification, if any
pub fn crossed_threshold(severity: Severity, thresholds: &Thresholds) -> Option<f64> {
    match severity {
        Severity::Ok => None,
        Severity::Warning => Some(thresholds.alert()),
        Severity::Critical => Some(thresholds.critical()),
    }
}
