//! Configuration module for the web UI
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`GLUETUN_*`, `PORT`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use gluetun_webui::config::WebUiConfig;
//!
//! let config = WebUiConfig::default();
//! assert_eq!(config.server.port, 3000);
//!
//! let toml = r#"
//! [instances.1]
//! url = "http://gluetun:8000"
//! "#;
//! let config: WebUiConfig = toml::from_str(toml).unwrap();
//! assert!(config.resolve_instances()[0].is_configured());
//! ```

pub mod error;
pub mod instance;
pub mod logging;
pub mod rate_limit;
pub mod server;

pub use error::ConfigError;
pub use instance::{Credentials, InstanceConfig, InstanceId, InstanceSettings, InstancesConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use rate_limit::{RateLimitConfig, WindowBudget};
pub use server::{ServerConfig, UpstreamConfig};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Commented example written by `config init`.
pub const EXAMPLE_CONFIG: &str = include_str!("../../gluetun-webui.example.toml");

/// Unified configuration for the web UI server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WebUiConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Control API client settings
    pub upstream: UpstreamConfig,
    /// Request budgets per route group
    pub rate_limit: RateLimitConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// The two instance slots
    pub instances: InstancesConfig,
}

impl WebUiConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_env_source(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. Invalid values are ignored and the
    /// previous setting is kept.
    pub fn with_env_source<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Server settings
        if let Some(port) = get("GLUETUN_WEBUI_PORT").or_else(|| get("PORT")) {
            if let Ok(p) = port.trim().parse() {
                self.server.port = p;
            }
        }
        if let Some(host) = get("GLUETUN_WEBUI_HOST") {
            self.server.host = host;
        }

        // Logging settings
        if let Some(level) = get("GLUETUN_WEBUI_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = get("GLUETUN_WEBUI_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        // Single-instance variables only ever fill slot 1
        {
            let one = self.instances.settings_mut(InstanceId::One);
            if let Some(url) = get("GLUETUN_CONTROL_URL") {
                one.url = Some(url);
            }
            if let Some(key) = get("GLUETUN_API_KEY") {
                one.api_key = Some(key);
            }
        }

        for id in InstanceId::ALL {
            let settings = self.instances.settings_mut(id);
            let var = |field: &str| get(&format!("GLUETUN_{}_{}", id.as_str(), field));

            if let Some(name) = var("NAME") {
                settings.name = Some(name);
            }
            if let Some(url) = var("URL") {
                settings.url = Some(url);
            }
            if let Some(key) = var("API_KEY") {
                settings.api_key = Some(key);
            }
            if let Some(username) = var("USERNAME") {
                settings.username = Some(username);
            }
            if let Some(password) = var("PASSWORD") {
                settings.password = Some(password);
            }
        }

        self
    }

    /// Resolve both instance slots in id order.
    pub fn resolve_instances(&self) -> Vec<InstanceConfig> {
        self.instances.resolve_all()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }

        if self.upstream.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "upstream.timeout_seconds".to_string(),
                message: "timeout must be at least one second".to_string(),
            });
        }

        let budgets = [
            ("rate_limit.read", &self.rate_limit.read),
            ("rate_limit.action", &self.rate_limit.action),
            ("rate_limit.ui", &self.rate_limit.ui),
        ];
        for (field, budget) in budgets {
            if budget.max_requests == 0 || budget.window_seconds == 0 {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: "max_requests and window_seconds must be non-zero".to_string(),
                });
            }
        }

        for instance in self.resolve_instances() {
            if let Some(url) = &instance.url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::Validation {
                        field: format!("instances.{}.url", instance.id),
                        message: format!("'{}' must start with http:// or https://", url),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = WebUiConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upstream.timeout_seconds, 5);
        let instances = config.resolve_instances();
        assert_eq!(instances.len(), 2);
        assert!(instances.iter().all(|i| !i.is_configured()));
    }

    #[test]
    fn test_config_parse_minimal_toml() {
        let config: WebUiConfig = toml::from_str("[server]\nport = 9000").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_config_parse_example_file() {
        let config: WebUiConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_limit.action.max_requests, 10);
    }

    #[test]
    fn test_config_parse_instances() {
        let toml = r#"
        [instances.1]
        name = "Home"
        url = "http://gluetun-home:8000"
        api_key = "abc"

        [instances.2]
        url = "http://gluetun-work:8000"
        username = "admin"
        password = "pw"
        "#;

        let config: WebUiConfig = toml::from_str(toml).unwrap();
        let instances = config.resolve_instances();
        assert_eq!(instances[0].name, "Home");
        assert_eq!(instances[0].credentials, Credentials::ApiKey("abc".to_string()));
        assert_eq!(instances[1].name, "Gluetun 2");
        assert!(matches!(instances[1].credentials, Credentials::Basic { .. }));
    }

    #[test]
    fn test_config_load_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nport = 8080").unwrap();

        let config = WebUiConfig::load(Some(temp.path())).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_missing_file_error() {
        let result = WebUiConfig::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_invalid_toml_error() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server\nport = ").unwrap();

        let result = WebUiConfig::load(Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_instance_variables() {
        let config = WebUiConfig::default().with_env_source(env(&[
            ("GLUETUN_1_URL", "http://a:8000"),
            ("GLUETUN_1_API_KEY", "key-1"),
            ("GLUETUN_2_NAME", "Backup"),
            ("GLUETUN_2_URL", "http://b:8000"),
            ("GLUETUN_2_USERNAME", "user"),
            ("GLUETUN_2_PASSWORD", "pass"),
        ]));

        let instances = config.resolve_instances();
        assert_eq!(instances[0].url.as_deref(), Some("http://a:8000"));
        assert_eq!(instances[0].credentials, Credentials::ApiKey("key-1".to_string()));
        assert_eq!(instances[1].name, "Backup");
        assert_eq!(
            instances[1].credentials,
            Credentials::Basic {
                username: "user".to_string(),
                password: Some("pass".to_string())
            }
        );
    }

    #[test]
    fn test_env_legacy_variables_fill_instance_one() {
        let config = WebUiConfig::default().with_env_source(env(&[
            ("GLUETUN_CONTROL_URL", "http://legacy:8000"),
            ("GLUETUN_API_KEY", "legacy-key"),
        ]));

        let instances = config.resolve_instances();
        assert_eq!(instances[0].url.as_deref(), Some("http://legacy:8000"));
        assert_eq!(
            instances[0].credentials,
            Credentials::ApiKey("legacy-key".to_string())
        );
        assert!(!instances[1].is_configured());
    }

    #[test]
    fn test_env_numbered_variables_beat_legacy() {
        let config = WebUiConfig::default().with_env_source(env(&[
            ("GLUETUN_CONTROL_URL", "http://legacy:8000"),
            ("GLUETUN_1_URL", "http://new:8000"),
        ]));
        assert_eq!(
            config.resolve_instances()[0].url.as_deref(),
            Some("http://new:8000")
        );
    }

    #[test]
    fn test_env_empty_values_ignored() {
        let mut base = WebUiConfig::default();
        base.instances.one.url = Some("http://file:8000".to_string());

        let config = base.with_env_source(env(&[("GLUETUN_1_URL", ""), ("PORT", "")]));
        assert_eq!(
            config.resolve_instances()[0].url.as_deref(),
            Some("http://file:8000")
        );
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_env_port() {
        let config = WebUiConfig::default().with_env_source(env(&[("PORT", "8080")]));
        assert_eq!(config.server.port, 8080);

        let config = WebUiConfig::default()
            .with_env_source(env(&[("PORT", "8080"), ("GLUETUN_WEBUI_PORT", "9090")]));
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_env_invalid_value_ignored() {
        let config = WebUiConfig::default().with_env_source(env(&[
            ("PORT", "not-a-number"),
            ("GLUETUN_WEBUI_LOG_FORMAT", "xml"),
        ]));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_logging() {
        let config = WebUiConfig::default().with_env_source(env(&[
            ("GLUETUN_WEBUI_LOG_LEVEL", "debug"),
            ("GLUETUN_WEBUI_LOG_FORMAT", "json"),
        ]));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_config_validation_zero_port() {
        let mut config = WebUiConfig::default();
        config.server.port = 0;

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "server.port"
        ));
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = WebUiConfig::default();
        config.upstream.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_budget() {
        let mut config = WebUiConfig::default();
        config.rate_limit.action.max_requests = 0;

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "rate_limit.action"
        ));
    }

    #[test]
    fn test_config_validation_bad_scheme() {
        let mut config = WebUiConfig::default();
        config.instances.two.url = Some("gluetun:8000".to_string());

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "instances.2.url"
        ));
    }

    #[test]
    fn test_config_load_none_returns_defaults() {
        let config = WebUiConfig::load(None).unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
