//! Configuration file support for the interface agent.
//!
//! Loads the agent configuration from a TOML file. Every field has a
//! default, so a missing file or a missing section is not an error.

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::afpacket::AfPacketOrchConfig;
use crate::daemon::OrchDaemonConfig;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/ifagent/ifagent.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete agent configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// AF_PACKET orchestrator configuration
    #[serde(default)]
    pub afpacket: AfPacketOrchConfig,

    /// Daemon loop configuration
    #[serde(default)]
    pub daemon: OrchDaemonConfig,
}

impl AgentConfig {
    /// Loads configuration from file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let config: Self = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        config.validate()?;
        Ok(config)
    }

    /// Loads from the default location or defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    /// Saves configuration to file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the daemon heartbeat as a Duration.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.daemon.heartbeat_interval_ms)
    }

    /// Validates configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.afpacket.event_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "afpacket.event_batch_size must be > 0".to_string(),
            ));
        }
        if self.daemon.heartbeat_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "daemon.heartbeat_interval_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert!(config.afpacket.host_if_tracking);
        assert_eq!(config.afpacket.event_batch_size, 128);
        assert_eq!(config.daemon.heartbeat_interval_ms, 1000);
        assert_eq!(config.heartbeat_interval(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[afpacket]
host_if_tracking = false
"#;
        let config: AgentConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.afpacket.host_if_tracking);
        // Unspecified values should use defaults
        assert_eq!(config.afpacket.event_batch_size, 128);
        assert_eq!(config.daemon, OrchDaemonConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_heartbeat() {
        let mut config = AgentConfig::default();
        config.daemon.heartbeat_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_nonexistent_file_defaults() {
        let config = AgentConfig::load_or_default("/nonexistent/ifagent.toml").unwrap();
        assert_eq!(config, AgentConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ifagent.toml");

        let mut config = AgentConfig::default();
        config.afpacket.host_if_tracking = false;
        config.daemon.heartbeat_interval_ms = 250;
        config.save(&path).unwrap();

        let loaded = AgentConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ifagent.toml");
        fs::write(&path, "[afpacket\nhost_if_tracking = yes").unwrap();

        assert!(matches!(
            AgentConfig::load_or_default(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ifagent.toml");
        fs::write(&path, "[afpacket]\nevent_batch_size = 0\n").unwrap();

        assert!(matches!(
            AgentConfig::load_or_default(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
