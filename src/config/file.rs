//! Configuration file loading
//!
//! TOML is the primary format; files ending in `.json` are parsed as JSON.

use crate::config::Config;
use crate::error::ConfigError;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load and validate configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
            _ => ConfigError::ParseError(format!("{}: {}", path.display(), e)),
        })?;

        let config = Self::parse(&content, Self::is_json(path))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration text
    pub fn parse(content: &str, json: bool) -> Result<Config, ConfigError> {
        let config: Config = if json {
            serde_json::from_str(content)?
        } else {
            toml::from_str(content)?
        };
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    ///
    /// A file that exists but fails to load is skipped with a warning.
    pub fn load_default() -> Option<Config> {
        for path in Self::default_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    return Some(config);
                }
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        None
    }

    /// Get default configuration file paths
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("/etc/machmon/config.toml")];

        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("machmon").join("config.toml"));
        }

        paths.push(PathBuf::from("machmon.toml"));
        paths.push(PathBuf::from("system_config.json"));

        paths
    }

    fn is_json(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_paths_not_empty() {
        let paths = ConfigFile::default_paths();
        assert!(!paths.is_empty());
        assert!(paths.iter().any(|p| p.ends_with("system_config.json")));
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigFile::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[general]
recovery_notices = true

[[machines]]
name = "Press 1"
endpoint = "opc.tcp://10.0.0.5:4840"
pollIntervalSecs = 5
"#
        )
        .unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert!(config.general.recovery_notices);
        assert_eq!(config.machines[0].poll_interval_secs, Some(5));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "machines": [{{
                    "id": "M001",
                    "name": "CNC Lathe 1",
                    "opc_url": "opc.tcp://10.0.0.1:4840",
                    "variables": [{{
                        "id": "V001",
                        "description": "Oil level",
                        "unit": "%",
                        "nodeRef": "ns=2;i=1",
                        "alertThreshold": 20,
                        "criticalThreshold": 15,
                        "direction": "at-most"
                    }}]
                }}],
                "technicians": [{{
                    "id": "T001",
                    "name": "Joao Silva",
                    "whatsapp": "+5554999123456",
                    "responsibleMachines": ["M001"]
                }}]
            }}"#
        )
        .unwrap();

        let config = ConfigFile::load(file.path()).unwrap();
        assert_eq!(config.machines[0].variables[0].alert_threshold, 20.0);
        assert_eq!(config.technicians[0].responsible_machines, vec!["M001"]);
    }

    #[test]
    fn test_load_rejects_invalid_machine() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[[machines]]
name = ""
endpoint = "opc.tcp://10.0.0.5:4840"
"#
        )
        .unwrap();

        assert!(matches!(
            ConfigFile::load(file.path()),
            Err(ConfigError::InvalidMachine { .. })
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            ConfigFile::parse("machines = 3", false),
            Err(ConfigError::TomlError(_))
        ));
        assert!(matches!(
            ConfigFile::parse("{", true),
            Err(ConfigError::JsonError(_))
        ));
    }
}
