// src/config.rs - TOML configuration
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub odyssey: OdysseyConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub web: WebConfig,
}

/// Connection to the Odyssey print engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OdysseyConfig {
    #[serde(default = "default_url")]
    pub url: String,

    /// Storage location used when a start request names none.
    #[serde(default = "default_location")]
    pub default_location: String,

    /// Strip a leading slash from start-request file identifiers. Some
    /// server builds expect it stripped, some do not.
    #[serde(default)]
    pub strip_leading_slash: bool,
}

/// Adaptive poll cadence of the work tracker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Interval while a print is believed active, in seconds.
    #[serde(default = "default_active_interval")]
    pub active_interval_secs: u64,

    /// Interval while idle, in seconds. Longer, to limit server load.
    #[serde(default = "default_idle_interval")]
    pub idle_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Config {
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.odyssey.url.is_empty() {
            return Err(ConfigError::Invalid("odyssey url cannot be empty".into()));
        }
        if self.polling.active_interval_secs == 0 || self.polling.idle_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "polling intervals must be at least 1 second".into(),
            ));
        }
        if self.web.bind.is_empty() {
            return Err(ConfigError::Invalid(
                "web bind address cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

impl PollingConfig {
    pub fn active_interval(&self) -> Duration {
        Duration::from_secs(self.active_interval_secs)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_secs(self.idle_interval_secs)
    }
}

impl Default for OdysseyConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            default_location: default_location(),
            strip_leading_slash: false,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            active_interval_secs: default_active_interval(),
            idle_interval_secs: default_idle_interval(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:12357".to_string()
}

fn default_location() -> String {
    "Local".to_string()
}

fn default_active_interval() -> u64 {
    1
}

fn default_idle_interval() -> u64 {
    10
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
        path: config_path.to_string(),
        source,
    })?;
    Config::parse_toml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_config() {
        let toml_config = r#"
[odyssey]
url = "http://192.168.1.40:12357"
default_location = "Local"
strip_leading_slash = true

[polling]
active_interval_secs = 2
idle_interval_secs = 30

[web]
bind = "127.0.0.1:8080"
        "#;

        let config = Config::parse_toml(toml_config).unwrap();
        assert_eq!(config.odyssey.url, "http://192.168.1.40:12357");
        assert!(config.odyssey.strip_leading_slash);
        assert_eq!(config.polling.active_interval(), Duration::from_secs(2));
        assert_eq!(config.polling.idle_interval(), Duration::from_secs(30));
        assert_eq!(config.web.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.odyssey.default_location, "Local");
        assert!(!config.odyssey.strip_leading_slash);
        assert_eq!(config.polling.active_interval_secs, 1);
        assert_eq!(config.polling.idle_interval_secs, 10);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.odyssey.url = String::new();
        assert!(config.validate().is_err());
        config.odyssey.url = default_url();

        config.polling.idle_interval_secs = 0;
        assert!(config.validate().is_err());
    }
}
