//! Unified error types for machmon
//!
//! This module defines all error types used throughout the engine.
//! Uses thiserror for ergonomic error definitions.

use std::time::Duration;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a device connection or read
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the notification transport
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// No machines configured
    #[error("No machines configured")]
    NoMachines,

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from device connectivity and variable reads
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// Failed to open a session to the machine
    #[error("Failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    /// An established session dropped
    #[error("Session lost: {0}")]
    SessionLost(String),

    /// A single variable could not be read
    #[error("Failed to read node '{node}': {reason}")]
    Read { node: String, reason: String },

    /// A read did not complete in time
    #[error("Read of node '{node}' timed out after {timeout:?}")]
    Timeout { node: String, timeout: Duration },

    /// The device returned a value that is not a finite number
    #[error("Node '{node}' returned a non-numeric value: {value}")]
    InvalidValue { node: String, value: String },
}

impl DeviceError {
    /// Whether this error affects the whole machine rather than one variable
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::SessionLost(_))
    }
}

/// Errors from domain type validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Threshold is NaN or infinite
    #[error("Threshold must be a finite number, got {0}")]
    NonFiniteThreshold(f64),

    /// Critical threshold is less extreme than the alert threshold
    #[error("Critical threshold {critical} is less severe than alert threshold {alert} for direction {direction}")]
    InvertedThresholds {
        alert: f64,
        critical: f64,
        direction: String,
    },

    /// Identifier or required text field is empty
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// Two variables of a machine share an id
    #[error("Duplicate variable id: {0}")]
    DuplicateVariable(String),

    /// Poll interval of zero
    #[error("Poll interval must be greater than zero")]
    ZeroInterval,
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Machine record failed validation
    #[error("Invalid machine '{machine}': {source}")]
    InvalidMachine {
        machine: String,
        #[source]
        source: DomainError,
    },

    /// Operation referenced a machine that is not registered
    #[error("Machine not found: {0}")]
    UnknownMachine(String),

    /// A different machine already uses this id
    #[error("Machine id already in use: {0}")]
    DuplicateId(String),

    /// A different machine already uses this endpoint
    #[error("Endpoint {endpoint} is already used by machine {owner}")]
    EndpointInUse { endpoint: String, owner: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors from the notification transport
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The transport refused the message for this address
    #[error("Delivery to {address} rejected: {reason}")]
    Rejected { address: String, reason: String },

    /// IO error while writing the message
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_classification() {
        let connect = DeviceError::Connect {
            endpoint: "opc.tcp://10.0.0.1:4840".to_string(),
            reason: "refused".to_string(),
        };
        assert!(connect.is_connectivity());
        assert!(DeviceError::SessionLost("reset".to_string()).is_connectivity());

        let read = DeviceError::Read {
            node: "ns=2;i=1".to_string(),
            reason: "bad node".to_string(),
        };
        assert!(!read.is_connectivity());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::EndpointInUse {
            endpoint: "opc.tcp://10.0.0.1:4840".to_string(),
            owner: "M001".to_string(),
        };
        assert!(err.to_string().contains("M001"));
        assert!(err.to_string().contains("opc.tcp://10.0.0.1:4840"));
    }

    #[test]
    fn test_timeout_display() {
        let err = DeviceError::Timeout {
            node: "ns=2;i=3".to_string(),
            timeout: Duration::from_millis(500),
        };
        assert!(err.to_string().contains("ns=2;i=3"));
        assert!(err.to_string().contains("500ms"));
    }

    #[test]
    fn test_inverted_thresholds_display() {
        let err = DomainError::InvertedThresholds {
            alert: 20.0,
            critical: 25.0,
            direction: "at-most".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Critical threshold 25 is less severe than alert threshold 20 for direction at-most"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err = ConfigError::UnknownMachine("M404".to_string());
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::Config(_)));
    }
}
