//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; missing sections fall back to defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("timeout_secs cannot be 0")]
    InvalidTimeout,

    #[error("base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("confirm_window_secs cannot be 0")]
    InvalidConfirmWindow,
}

/// Raw server configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Base URL of the council backend API
    pub base_url: String,
    /// Timeout in seconds for backend requests
    ///
    /// Deliberation runs three stages across several models, so the
    /// default is generous.
    pub timeout_secs: u64,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001/api".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Raw UI configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUiConfig {
    /// Seconds an armed deletion stays confirmable
    pub confirm_window_secs: u64,
    /// Enable colored terminal output
    pub color: bool,
    /// Path to the REPL history file
    pub history_file: Option<String>,
}

impl Default for FileUiConfig {
    fn default() -> Self {
        Self {
            confirm_window_secs: 30,
            color: true,
            history_file: None,
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend connection settings
    pub server: FileServerConfig,
    /// Interactive UI settings
    pub ui: FileUiConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if self.server.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }

        if self.ui.confirm_window_secs == 0 {
            return Err(ConfigValidationError::InvalidConfirmWindow);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[server]
base_url = "https://council.example.com/api"
timeout_secs = 300

[ui]
confirm_window_secs = 10
color = false
history_file = "~/.local/share/llm-council/history.txt"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "https://council.example.com/api");
        assert_eq!(config.server.timeout_secs, 300);
        assert_eq!(config.ui.confirm_window_secs, 10);
        assert!(!config.ui.color);
        assert!(config.ui.history_file.is_some());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[server]
base_url = "http://127.0.0.1:9000/api"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:9000/api");
        // Defaults should apply
        assert_eq!(config.server.timeout_secs, 120);
        assert_eq!(config.ui.confirm_window_secs, 30);
        assert!(config.ui.color);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.server.base_url, "http://localhost:8001/api");
        assert_eq!(config.server.timeout_secs, 120);
        assert_eq!(config.ui.confirm_window_secs, 30);
        assert!(config.ui.color);
        assert!(config.ui.history_file.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let toml_str = r#"
[server]
timeout_secs = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_validate_empty_base_url() {
        let toml_str = r#"
[server]
base_url = "  "
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyBaseUrl)
        ));
    }

    #[test]
    fn test_validate_zero_confirm_window() {
        let toml_str = r#"
[ui]
confirm_window_secs = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidConfirmWindow)
        ));
    }
}
