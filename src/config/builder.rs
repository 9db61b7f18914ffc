//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must load; without one the default locations are
    /// searched and defaults are kept when none exists.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default(),
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI verbose flag
    pub fn with_verbose(mut self, verbose: Option<bool>) -> Self {
        if let Some(v) = verbose {
            self.config.general.verbose = v;
        }
        self
    }

    /// Override with CLI interval
    pub fn with_interval(mut self, interval: Option<u64>) -> Self {
        if let Some(i) = interval {
            self.config.general.poll_interval_secs = i;
        }
        self
    }

    /// Override with CLI recovery notice flag
    pub fn with_recovery_notices(mut self, enabled: Option<bool>) -> Self {
        if let Some(e) = enabled {
            self.config.general.recovery_notices = e;
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.general.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert!(!config.general.verbose);
        assert!(!config.general.recovery_notices);
        assert_eq!(config.general.poll_interval_secs, 30);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ConfigBuilder::new()
            .with_verbose(Some(true))
            .with_interval(Some(10))
            .with_recovery_notices(Some(true))
            .build()
            .unwrap();

        assert!(config.general.verbose);
        assert_eq!(config.general.poll_interval_secs, 10);
        assert!(config.general.recovery_notices);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[general]\npoll_interval_secs = 15").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let from_file = ConfigBuilder::new()
            .with_file(Some(&path))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(from_file.general.poll_interval_secs, 15);

        let overridden = ConfigBuilder::new()
            .with_file(Some(&path))
            .unwrap()
            .with_interval(Some(60))
            .build()
            .unwrap();
        assert_eq!(overridden.general.poll_interval_secs, 60);
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        assert!(ConfigBuilder::new()
            .with_file(Some("/nonexistent/machmon.toml"))
            .is_err());
    }

    #[test]
    fn test_zero_interval_override_rejected() {
        assert!(ConfigBuilder::new().with_interval(Some(0)).build().is_err());
    }
}
