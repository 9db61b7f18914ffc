//! machmon - industrial machine telemetry monitor
//!
//! This library provides the polling and threshold-alerting engine: one
//! poller per machine samples its variables, classifies each reading and
//! notifies the technicians responsible for that machine on alert edges.
//!
//! # Modules
//!
//! - [`alerts`]: Threshold evaluation, alert state, routing and delivery
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`device`]: Device reader abstraction layer
//! - [`domain`]: Domain models with validation
//! - [`error`]: Error types
//! - [`services`]: Pollers, registry and supervisor

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod device;
pub mod domain;
pub mod error;
pub mod services;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
