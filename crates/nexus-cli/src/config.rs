//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "NEXUS_CONFIG_PATH";
/// Environment variable holding the user id
pub const USER_ENV: &str = "NEXUS_USER";
/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "NEXUS_API_TOKEN";

/// Configuration for nexus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL, e.g. `https://spaces.example.com`
    pub base_url: Option<String>,
    /// Session user id
    pub user_id: Option<String>,
    /// Bearer token (alternative to NEXUS_API_TOKEN)
    pub api_token: Option<String>,
    /// "dark" or "light"
    pub theme: Option<String>,
    /// Log file used while the TUI is up
    pub log_file: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nexus")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Self::default()
            }),
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            base_url: Some(crate::DEFAULT_BASE_URL.to_string()),
            theme: Some("dark".to_string()),
            ..Default::default()
        };

        default_config.save()?;
        Ok(path)
    }

    /// User id from config, falling back to the environment
    pub fn user_id(&self) -> Option<String> {
        self.user_id
            .clone()
            .or_else(|| std::env::var(USER_ENV).ok())
            .filter(|id| !id.trim().is_empty())
    }

    /// API token from config, falling back to the environment
    pub fn api_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV).ok())
    }

    /// Where TUI-mode logs go
    pub fn log_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => PathBuf::from(path),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("nexus")
                .join("nexus.log"),
        }
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# nexus configuration file
# Place at ~/.config/nexus/config.toml (Linux) or set NEXUS_CONFIG_PATH

# Backend serving /api/conversations
base_url = "http://localhost:3000"

# Your user id (or set NEXUS_USER)
user_id = "your-user-id"

# Bearer token, if the backend requires one (or set NEXUS_API_TOKEN)
# api_token = "..."

# Color theme: dark or light
theme = "dark"

# Log file used while the TUI is running
# log_file = "/tmp/nexus.log"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config = Config::parse(example_config()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.user_id.as_deref(), Some("your-user-id"));
        assert_eq!(config.theme.as_deref(), Some("dark"));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_missing_fields_default() {
        let config = Config::parse("theme = \"light\"\n").unwrap();
        assert!(config.base_url.is_none());
        assert_eq!(config.theme.as_deref(), Some("light"));
    }

    #[test]
    fn test_explicit_log_path() {
        let config = Config {
            log_file: Some("/tmp/custom.log".into()),
            ..Default::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/tmp/custom.log"));
    }

    #[test]
    fn test_blank_user_id_is_missing() {
        let config = Config {
            user_id: Some("  ".into()),
            ..Default::default()
        };
        assert!(config.user_id().is_none());
    }
}
