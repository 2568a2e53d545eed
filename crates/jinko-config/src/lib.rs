//! Configuration loading for the jinko population board.
//!
//! Settings live in `config.toml` under the platform config directory
//! (for example `~/.config/jinko/config.toml` on Linux). The RESAS API
//! key may instead be supplied via the `RESAS_API_KEY` environment
//! variable, which takes precedence over the file.

use std::path::PathBuf;
use std::{env, fs};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

/// Public RESAS open-data endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://opendata.resas-portal.go.jp";

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "RESAS_API_KEY";

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RESAS API key sent as `X-API-KEY` on every request.
    pub api_key: String,
    /// Base URL of the RESAS API.
    pub endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no API key configured: set RESAS_API_KEY or add api_key to config.toml")]
    MissingApiKey,
}

impl Config {
    /// Load configuration from the user config directory, applying the
    /// environment override and requiring an API key.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::parse(&fs::read_to_string(&path)?)?,
            _ => Self::default(),
        };
        if let Ok(key) = env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            config.api_key = key;
        }
        if config.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(config)
    }

    /// Parse a TOML document into a config, filling omitted fields with
    /// their defaults.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Location of the config file, if a home directory can be resolved.
fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "jinko").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let config = Config::parse(
            r#"
api_key = "secret"
endpoint = "https://example.test"
"#,
        )
        .unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.endpoint, "https://example.test");
    }

    #[test]
    fn omitted_fields_fall_back_to_defaults() {
        let config = Config::parse("api_key = \"secret\"\n").unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);

        let empty = Config::parse("").unwrap();
        assert!(empty.api_key.is_empty());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            Config::parse("api_key = "),
            Err(ConfigError::Parse(_))
        ));
    }
}
