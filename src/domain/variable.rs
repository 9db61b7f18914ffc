//! Variable domain types
//!
//! A variable is one sampled, unit-bearing quantity on a machine together with
//! the thresholds it is classified against.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Variable identifier, unique within its machine
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(String);

impl VariableId {
    /// Create a new variable identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariableId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Which side of a threshold is the bad side
///
/// `AtMost` breaches when `value <= threshold` (oil level, fluid level).
/// `AtLeast` breaches when `value >= threshold` (temperature, vibration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Too low is bad
    AtMost,
    /// Too high is bad
    AtLeast,
}

impl Direction {
    /// Whether `value` is on the bad side of `threshold`
    #[inline]
    pub fn breaches(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::AtMost => value <= threshold,
            Self::AtLeast => value >= threshold,
        }
    }

    /// Whether `a` is at least as extreme as `b` in this direction
    fn at_least_as_extreme(self, a: f64, b: f64) -> bool {
        match self {
            Self::AtMost => a <= b,
            Self::AtLeast => a >= b,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtMost => write!(f, "at-most"),
            Self::AtLeast => write!(f, "at-least"),
        }
    }
}

/// Alert and critical thresholds with their comparison direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    alert: f64,
    critical: f64,
    direction: Direction,
}

impl Thresholds {
    /// Create validated thresholds
    ///
    /// Both values must be finite and the critical threshold must be at least
    /// as extreme as the alert threshold in the given direction.
    pub fn new(alert: f64, critical: f64, direction: Direction) -> Result<Self, DomainError> {
        for value in [alert, critical] {
            if !value.is_finite() {
                return Err(DomainError::NonFiniteThreshold(value));
            }
        }

        if !direction.at_least_as_extreme(critical, alert) {
            return Err(DomainError::InvertedThresholds {
                alert,
                critical,
                direction: direction.to_string(),
            });
        }

        Ok(Self {
            alert,
            critical,
            direction,
        })
    }

    /// Alert (warning) threshold
    #[inline]
    pub fn alert(&self) -> f64 {
        self.alert
    }

    /// Critical threshold
    #[inline]
    pub fn critical(&self) -> f64 {
        self.critical
    }

    /// Comparison direction
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.direction {
            Direction::AtMost => "<=",
            Direction::AtLeast => ">=",
        };
        write!(
            f,
            "warning {} {}, critical {} {}",
            op, self.alert, op, self.critical
        )
    }
}

/// Configured variable of a machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSpec {
    /// Variable identifier
    pub id: VariableId,
    /// Human-readable description
    pub description: String,
    /// Unit of measurement
    pub unit: String,
    /// Device node reference
    pub node: String,
    /// Classification thresholds
    pub thresholds: Thresholds,
}

impl VariableSpec {
    /// Create a new variable specification
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        node: impl Into<String>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            id: VariableId::new(id),
            description: description.into(),
            unit: unit.into(),
            node: node.into(),
            thresholds,
        }
    }
}
