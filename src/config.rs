//! Configuration - Payload sources and injection defaults
//!
//! Configuration is read from a TOML file:
//!
//! ```toml
//! [payloads]
//! dir = "payloads"
//! default_categories = ["sqli", "xss", "cmd", "dir", "misc"]
//!
//! [payloads.sets]
//! custom = ["a", "b"]
//!
//! [inject]
//! encoding = "raw"
//! append = false
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::payloads::PayloadEncoding;

/// File name looked up in the working directory
pub const LOCAL_CONFIG: &str = ".httpinject.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub payloads: PayloadsConfig,
    pub inject: InjectDefaults,
}

/// Where payload sets come from
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PayloadsConfig {
    /// Directory with one payload file per set
    pub dir: Option<PathBuf>,
    /// Categories aggregated into the `default` set
    pub default_categories: Option<Vec<String>>,
    /// Inline payload sets
    pub sets: IndexMap<String, Vec<String>>,
}

/// Defaults applied to injections when the caller does not override them
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InjectDefaults {
    /// Pre-processing applied to every payload
    pub encoding: PayloadEncoding,
    /// Append payloads to the original value instead of replacing it
    pub append: bool,
}

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Config file not found")]
    NotFound,

    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigLoadError> {
        toml::from_str(text).map_err(|e| ConfigLoadError::ParseError(e.to_string()))
    }

    /// Candidate config locations, in lookup order
    pub fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join("httpinject").join("config.toml"));
        }
        locations
    }

    /// Load configuration from `path`, or from the first default location
    ///
    /// A relative payload directory is resolved against the directory of
    /// the config file.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let path = match path {
            Some(p) if p.exists() => p.to_path_buf(),
            Some(_) => return Err(ConfigLoadError::NotFound),
            None => Self::default_locations()
                .into_iter()
                .find(|p| p.exists())
                .ok_or(ConfigLoadError::NotFound)?,
        };

        let text = std::fs::read_to_string(&path)
            .map_err(|e| ConfigLoadError::ReadError(format!("{}: {}", path.display(), e)))?;
        let mut config = Self::from_toml(&text)?;

        if let (Some(dir), Some(parent)) = (&config.payloads.dir, path.parent()) {
            if dir.is_relative() {
                config.payloads.dir = Some(parent.join(dir));
            }
        }

        Ok(config)
    }

    /// Try to load from file, falling back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => {
                tracing::debug!("Loaded config from file");
                config
            }
            Err(ConfigLoadError::NotFound) => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.payloads.dir.is_none());
        assert!(config.payloads.sets.is_empty());
        assert_eq!(config.inject.encoding, PayloadEncoding::Raw);
        assert!(!config.inject.append);
    }

    #[test]
    fn full_config_parses() {
        let config = Config::from_toml(
            r#"
            [payloads]
            dir = "/opt/payloads"
            default_categories = ["sqli"]

            [payloads.sets]
            custom = ["a", "b"]

            [inject]
            encoding = "double-url"
            append = true
            "#,
        )
        .unwrap();

        assert_eq!(config.payloads.dir, Some(PathBuf::from("/opt/payloads")));
        assert_eq!(
            config.payloads.default_categories,
            Some(vec!["sqli".to_string()])
        );
        assert_eq!(config.payloads.sets["custom"], vec!["a", "b"]);
        assert_eq!(config.inject.encoding, PayloadEncoding::DoubleUrl);
        assert!(config.inject.append);
    }

    #[test]
    fn invalid_config_is_parse_error() {
        let err = Config::from_toml("[inject]\nencoding = \"rot13\"").unwrap_err();
        assert!(matches!(err, ConfigLoadError::ParseError(_)));
    }

    #[test]
    fn missing_explicit_path_is_not_found() {
        let err = Config::load_from_file(Some(Path::new("/nonexistent/httpinject.toml")))
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::NotFound));
    }

    #[test]
    fn relative_payload_dir_resolved_against_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[payloads]\ndir = \"payloads\"\n").unwrap();

        let config = Config::load_from_file(Some(&path)).unwrap();
        assert_eq!(config.payloads.dir, Some(dir.path().join("payloads")));
    }
}
