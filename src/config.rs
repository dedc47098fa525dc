//! Configuration file support.
//!
//! The configuration is a small TOML document. Every field is optional; when no
//! file is found the built-in registry of OLDs is used.
//!
//! ```toml
//! username = "fieldworker"
//! url_template = "https://projects.linguistics.ubc.ca/{id}old/"
//!
//! [[backends]]
//! id = "bla"
//! label = "Blackfoot"
//!
//! [[backends]]
//! id = "local"
//! label = "Local test OLD"
//! url = "http://127.0.0.1:8000/"
//! ```

use crate::error::{CrossOldError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Endpoint pattern used by the OLDs hosted at UBC.
pub const DEFAULT_URL_TEMPLATE: &str = "https://projects.linguistics.ubc.ca/{id}old/";

const CONFIG_DIR_NAME: &str = "crossold";
const CONFIG_FILE_NAME: &str = "config.toml";

/// One `[[backends]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    pub id: String,
    pub label: String,
    /// Explicit endpoint; derived from `url_template` when absent
    #[serde(default)]
    pub url: Option<String>,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub url_template: Option<String>,
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

impl Config {
    /// Load configuration from an explicit path, or from the user config directory.
    ///
    /// An explicit path must exist. The default location is optional and yields
    /// `Config::default()` when missing.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CrossOldError::io(format!("Failed to read config: {}", path.display()), e)
        })?;
        Self::from_toml_str(&raw)
            .map_err(|e| CrossOldError::config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// URL template with `{id}` placeholder.
    pub fn url_template(&self) -> &str {
        self.url_template.as_deref().unwrap_or(DEFAULT_URL_TEMPLATE)
    }
}

/// `<config_dir>/crossold/config.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml_str(
            r#"
            username = "fieldworker"
            url_template = "https://example.org/{id}/"

            [[backends]]
            id = "bla"
            label = "Blackfoot"

            [[backends]]
            id = "local"
            label = "Local"
            url = "http://127.0.0.1:8000/"
            "#,
        )
        .unwrap();

        assert_eq!(config.username.as_deref(), Some("fieldworker"));
        assert_eq!(config.url_template(), "https://example.org/{id}/");
        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.backends[0].url, None);
        assert_eq!(
            config.backends[1].url.as_deref(),
            Some("http://127.0.0.1:8000/")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.url_template(), DEFAULT_URL_TEMPLATE);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml_str("colour = true").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "username = \"ana\"").unwrap();
        file.flush().unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.username.as_deref(), Some("ana"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(CrossOldError::Io { .. })));
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "backends = 3").unwrap();
        file.flush().unwrap();

        match Config::load(Some(file.path())) {
            Err(CrossOldError::ConfigError { message }) => {
                assert!(message.contains(&file.path().display().to_string()));
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }
}
