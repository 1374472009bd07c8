//! Command-line configuration

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{QueryError, QueryResult};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "influxql.toml";

/// Defaults the CLI falls back to when a flag is absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database for continuous queries
    pub database: Option<String>,

    /// Measurement used when `--from` is not given
    pub measurement: Option<String>,

    /// Colorize terminal output
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_true() -> bool { true }

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            measurement: None,
            color: true,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> QueryResult<Self> {
        toml::from_str(text).map_err(|e| QueryError::Config(e.to_string()))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `./influxql.toml` and then
    /// `<config dir>/influxql/config.toml` are tried; if neither exists the
    /// defaults are used.
    pub fn load(path: Option<&Path>) -> QueryResult<Self> {
        if let Some(path) = path {
            return Self::read(path);
        }
        match Self::candidates().into_iter().find(|p| p.is_file()) {
            Some(found) => Self::read(&found),
            None => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("influxql").join("config.toml"));
        }
        paths
    }

    fn read(path: &Path) -> QueryResult<Self> {
        debug!(path = %path.display(), "loading config");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            database = "telemetry"
            measurement = "cpu"
            color = false
            "#,
        )
        .unwrap();
        assert_eq!(config.database.as_deref(), Some("telemetry"));
        assert_eq!(config.measurement.as_deref(), Some("cpu"));
        assert!(!config.color);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
        assert!(Config::default().color);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml("databse = \"x\"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let missing = std::env::temp_dir().join("influxql-no-such-config.toml");
        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, QueryError::Io(_)));
    }

    #[test]
    fn test_explicit_path_is_read() {
        let path = std::env::temp_dir().join(format!("influxql-config-{}.toml", std::process::id()));
        std::fs::write(&path, "measurement = \"mem\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.measurement.as_deref(), Some("mem"));
    }
}
