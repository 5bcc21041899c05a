//! Global configuration for reward
//!
//! Located at `~/.config/reward/config.toml`

use crate::{ConfigError, PeeringConfig, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Global reward configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub docker: DockerConfig,
    pub peering: PeeringConfig,
}

/// Docker engine connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Docker socket path or `http(s)://` URL
    pub socket: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: default_docker_socket(),
        }
    }
}

#[cfg(windows)]
fn default_docker_socket() -> String {
    "//./pipe/docker_engine".to_string()
}

#[cfg(not(windows))]
fn default_docker_socket() -> String {
    "/var/run/docker.sock".to_string()
}

impl GlobalConfig {
    /// Load global configuration from the default path
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load global configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(
            "Loaded config from {:?}: domain={}, resolve_domain_to_proxy={}",
            path,
            config.peering.domain,
            config.peering.resolve_domain_to_proxy
        );

        Ok(config)
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "reward").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path (helper binaries are installed below it)
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "reward").ok_or(ConfigError::NoDataDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert!(config.peering.resolve_domain_to_proxy);
        assert!(config.peering.services.is_empty());
        #[cfg(not(windows))]
        assert_eq!(config.docker.socket, "/var/run/docker.sock");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[docker]
socket = "unix:///run/user/1000/docker.sock"

[peering]
resolve_domain_to_proxy = false
domain = "reward.test"
subdomain = "app"

[peering.services]
mailhog = false
adminer = true
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.docker.socket, "unix:///run/user/1000/docker.sock");
        assert!(!config.peering.resolve_domain_to_proxy);
        assert_eq!(config.peering.domain, "reward.test");
        assert_eq!(config.peering.subdomain.as_deref(), Some("app"));
        assert_eq!(config.peering.services.get("mailhog"), Some(&false));
        assert_eq!(config.peering.services.get("adminer"), Some(&true));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = GlobalConfig::load_from(&tmp.path().join("nope.toml")).unwrap();
        assert!(config.peering.resolve_domain_to_proxy);
    }

    #[test]
    fn test_load_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[peering\ndomain = ").unwrap();

        let err = GlobalConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseError { .. }));
    }
}
