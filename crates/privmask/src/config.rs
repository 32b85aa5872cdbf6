//! Configuration management for privmask.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "privmask";

/// Default preference database file name.
const PREFERENCES_FILE_NAME: &str = "preferences.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PRIVMASK_`, sections split on `__`,
///    e.g. `PRIVMASK_PRIVACY__DEFAULT_ENABLED=false`)
/// 2. TOML config file at `~/.config/privmask/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Privacy configuration.
    pub privacy: PrivacyConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Privacy-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Whether masking is on when no preference has been stored yet.
    pub default_enabled: bool,
    /// Username to mask when the caller does not supply one.
    /// When unset, the username is inferred from each text.
    pub username: Option<String>,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the preference database.
    /// Defaults to `~/.local/share/privmask/preferences.db`
    pub preferences_path: Option<PathBuf>,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            default_enabled: true,
            username: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("PRIVMASK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if let Some(username) = &self.privacy.username {
            if username.is_empty() {
                return Err(Error::ConfigValidation {
                    message: "privacy.username must not be empty".to_string(),
                });
            }

            if username.contains(['/', '\\', '\r', '\n']) {
                return Err(Error::ConfigValidation {
                    message: "privacy.username must not contain path separators or line breaks"
                        .to_string(),
                });
            }
        }

        if let Some(path) = &self.storage.preferences_path {
            if path.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "storage.preferences_path must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the preference database path, resolving defaults if not set.
    #[must_use]
    pub fn preferences_path(&self) -> PathBuf {
        self.storage
            .preferences_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(PREFERENCES_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.privacy.default_enabled);
        assert!(config.privacy.username.is_none());
        assert!(config.storage.preferences_path.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_username_ok() {
        let mut config = Config::default();
        config.privacy.username = Some("alice".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_username() {
        let mut config = Config::default();
        config.privacy.username = Some(String::new());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("privacy.username"));
    }

    #[test]
    fn test_validate_username_with_separator() {
        let mut config = Config::default();
        config.privacy.username = Some("home/alice".to_string());

        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("path separators"));
    }

    #[test]
    fn test_validate_empty_preferences_path() {
        let mut config = Config::default();
        config.storage.preferences_path = Some(PathBuf::new());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("preferences_path"));
    }

    #[test]
    fn test_preferences_path_default() {
        let config = Config::default();
        let path = config.preferences_path();

        assert!(path.to_string_lossy().contains("preferences.db"));
        assert!(path.to_string_lossy().contains("privmask"));
    }

    #[test]
    fn test_preferences_path_custom() {
        let mut config = Config::default();
        config.storage.preferences_path = Some(PathBuf::from("/custom/prefs.db"));

        assert_eq!(config.preferences_path(), PathBuf::from("/custom/prefs.db"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("privmask"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[privacy]\ndefault_enabled = false\nusername = \"alice\"\n\n[storage]\npreferences_path = \"/tmp/prefs.db\""
        )
        .unwrap();

        let config = Config::load_from(Some(file.path().to_path_buf())).unwrap();
        assert!(!config.privacy.default_enabled);
        assert_eq!(config.privacy.username.as_deref(), Some("alice"));
        assert_eq!(config.preferences_path(), PathBuf::from("/tmp/prefs.db"));
    }

    #[test]
    fn test_load_rejects_invalid_username() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[privacy]\nusername = \"\"").unwrap();

        let err = Config::load_from(Some(file.path().to_path_buf())).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_privacy_config_serialize() {
        let privacy = PrivacyConfig::default();
        let json = serde_json::to_string(&privacy).unwrap();
        assert!(json.contains("default_enabled"));
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"preferences_path": "/data/prefs.db"}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.preferences_path, Some(PathBuf::from("/data/prefs.db")));
    }
}
