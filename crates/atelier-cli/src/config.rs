//! Configuration for the `atelier` binary.
//!
//! Settings come from an optional YAML file (default `atelier-config.yaml`
//! in the working directory):
//!
//! ```yaml
//! paths:
//!   state_file: config/evolution.json
//!   rules_file: config/evolution-rules.json
//! logging:
//!   level: info
//! ```
//!
//! Environment variables override the file:
//! - `ATELIER_STATE_FILE` overrides `paths.state_file`
//! - `ATELIER_RULES_FILE` overrides `paths.rules_file`
//! - `ATELIER_LOG_LEVEL` overrides `logging.level`
//!
//! `RUST_LOG`, when set, takes precedence over the configured log level.

use std::path::{Path, PathBuf};

use atelier_evolution::{DEFAULT_RULES_PATH, DEFAULT_STATE_PATH};
use serde::Deserialize;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "atelier-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },
}

/// Top-level binary configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AtelierConfig {
    /// Where the state and rules files live.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AtelierConfig {
    /// Load configuration, then apply environment overrides.
    ///
    /// With an explicit `path`, the file must exist. Without one,
    /// [`DEFAULT_CONFIG_PATH`] is read if present and defaults are used
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if a required file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read configuration from a YAML file, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its
    /// value when set.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("ATELIER_STATE_FILE") {
            self.paths.state_file = PathBuf::from(val);
        }
        if let Some(val) = lookup("ATELIER_RULES_FILE") {
            self.paths.rules_file = PathBuf::from(val);
        }
        if let Some(val) = lookup("ATELIER_LOG_LEVEL") {
            self.logging.level = val;
        }
    }
}

/// File locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathsConfig {
    /// Evolution state file.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Evolution rules file.
    #[serde(default = "default_rules_file")]
    pub rules_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            rules_file: default_rules_file(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_PATH)
}

fn default_rules_file() -> PathBuf {
    PathBuf::from(DEFAULT_RULES_PATH)
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn defaults_point_at_project_config_dir() {
        let config = AtelierConfig::default();
        assert_eq!(config.paths.state_file, Path::new("config/evolution.json"));
        assert_eq!(
            config.paths.rules_file,
            Path::new("config/evolution-rules.json")
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = "paths:\n  state_file: /var/lib/atelier/state.json\n  rules_file: rules.json\nlogging:\n  level: debug\n";
        let config = AtelierConfig::parse(yaml);
        assert!(config.is_ok());
        if let Ok(config) = config {
            assert_eq!(
                config.paths.state_file,
                Path::new("/var/lib/atelier/state.json")
            );
            assert_eq!(config.paths.rules_file, Path::new("rules.json"));
            assert_eq!(config.logging.level, "debug");
        }
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = AtelierConfig::parse("logging:\n  level: warn\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.paths, PathsConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(AtelierConfig::parse("").ok(), Some(AtelierConfig::default()));
    }

    #[test]
    fn parse_invalid_yaml_fails() {
        assert!(AtelierConfig::parse("paths: [unclosed").is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: BTreeMap<&str, &str> = [
            ("ATELIER_STATE_FILE", "/tmp/state.json"),
            ("ATELIER_LOG_LEVEL", "trace"),
        ]
        .into_iter()
        .collect();

        let mut config = AtelierConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| (*v).to_owned()));

        assert_eq!(config.paths.state_file, Path::new("/tmp/state.json"));
        assert_eq!(
            config.paths.rules_file,
            Path::new("config/evolution-rules.json")
        );
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let result = AtelierConfig::load(Some(&dir.path().join("absent.yaml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn explicit_file_is_read() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let path = dir.path().join("atelier-config.yaml");
        std::fs::write(&path, "paths:\n  rules_file: custom-rules.json\n").ok();

        let config = AtelierConfig::from_file(&path);
        assert!(config.is_ok_and(|c| c.paths.rules_file == Path::new("custom-rules.json")));
    }
}
