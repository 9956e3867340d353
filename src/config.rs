//! Service configuration
//!
//! Loaded from a YAML file plus environment overrides; the provider
//! credential only ever comes from the environment (or a .env file).
//! Environment variables always win over file values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Credential value shipped in example configs; treated as absent.
pub const PLACEHOLDER_API_KEY: &str = "sk-0000000000000000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL. `postgres://...` selects the production engine;
    /// anything else selects the in-memory development engine.
    pub url: String,

    /// Production pool size; ignored by the development engine.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_pool_size() -> usize {
    16
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "duckdb::memory:".to_string(),
            pool_size: default_pool_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible endpoint; `None` uses the vendor
    /// default.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Chat model identifier.
    pub model: String,

    /// Ceiling for one provider call, in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            output: "stdout".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file with environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("FINBOT_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("FINBOT_SERVER_PORT") {
            if let Ok(port_num) = port.parse() {
                self.server.port = port_num;
            }
        }
        if let Ok(url) = std::env::var("FINBOT_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(endpoint) = std::env::var("FINBOT_PROVIDER_ENDPOINT") {
            self.provider.endpoint = Some(endpoint);
        }
        if let Ok(model) = std::env::var("FINBOT_PROVIDER_MODEL") {
            self.provider.model = model;
        }
        if let Ok(timeout) = std::env::var("FINBOT_PROVIDER_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.provider.timeout_secs = secs;
            }
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.logging.directory = dir;
        }
    }

    /// Provider credential from the environment (usually via .env).
    pub fn get_api_key() -> Result<String, ConfigError> {
        std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))
    }

    /// Set logging environment variables for the logging module.
    pub fn apply_logging_env(&self) {
        std::env::set_var("RUST_LOG", &self.logging.level);
        std::env::set_var("LOG_FORMAT", &self.logging.format);
        std::env::set_var("LOG_OUTPUT", &self.logging.output);
        std::env::set_var("LOG_DIR", &self.logging.directory);
    }
}

/// A blank or placeholder credential counts as unconfigured. A malformed
/// credential is intentionally treated the same way as a missing one so the
/// service can be reconfigured at runtime without restarting.
pub fn credential_is_usable(api_key: &str) -> bool {
    let trimmed = api_key.trim();
    !trimmed.is_empty() && trimmed != PLACEHOLDER_API_KEY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "duckdb::memory:");
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.timeout_secs, 120);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
server:
  host: "0.0.0.0"
  port: 9000
"#;
        let temp_file = std::env::temp_dir().join("finbot_test_partial.yaml");
        std::fs::write(&temp_file, yaml).unwrap();

        let config = Config::load(&temp_file).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.url, "duckdb::memory:");

        std::fs::remove_file(temp_file).ok();
    }

    #[test]
    fn test_env_var_override() {
        std::env::set_var("FINBOT_DATABASE_URL", "postgres://db.internal/erp");
        std::env::set_var("FINBOT_PROVIDER_TIMEOUT_SECS", "30");

        let yaml = r#"
database:
  url: "duckdb::memory:"
provider:
  model: "gpt-4o-mini"
  timeout_secs: 120
"#;
        let temp_file = std::env::temp_dir().join("finbot_test_env.yaml");
        std::fs::write(&temp_file, yaml).unwrap();

        let config = Config::load(&temp_file).unwrap();
        assert_eq!(config.database.url, "postgres://db.internal/erp");
        assert_eq!(config.provider.timeout_secs, 30);

        std::env::remove_var("FINBOT_DATABASE_URL");
        std::env::remove_var("FINBOT_PROVIDER_TIMEOUT_SECS");
        std::fs::remove_file(temp_file).ok();
    }

    #[test]
    fn test_credential_usability() {
        assert!(!credential_is_usable(""));
        assert!(!credential_is_usable("   "));
        assert!(!credential_is_usable(PLACEHOLDER_API_KEY));
        assert!(credential_is_usable("sk-real-key"));
    }
}
