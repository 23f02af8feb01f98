//! Configuration loading and management
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. a YAML file (path in `TICKETS_CONFIG`, optional)
//! 3. environment variables
//!
//! | Variable               | Setting                                 |
//! |------------------------|-----------------------------------------|
//! | `TICKETS_HOST`         | `server.host`                           |
//! | `TICKETS_PORT`         | `server.port`                           |
//! | `TICKETS_CORS_ORIGINS` | `cors.allowed_origins` (comma-separated) |
//! | `DATABASE_URL`         | `storage.database_url`                  |
//! | `TICKETS_STORAGE`      | `storage.backend`                       |
//! | `TICKETS_LOG_LEVEL`    | `log_level`                             |

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const CONFIG_PATH_VAR: &str = "TICKETS_CONFIG";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
}

impl ConfigError {
    fn invalid(field: &str, value: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.into(),
            message: message.into(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub pagination: PaginationConfig,
    /// Default `tracing` filter when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            storage: StorageConfig::default(),
            pagination: PaginationConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
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

/// Browser origins allowed to call the API
///
/// An empty list disables cross-origin access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Postgres,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_memory" => Ok(StorageBackend::InMemory),
            "postgres" => Ok(StorageBackend::Postgres),
            other => Err(ConfigError::invalid(
                "storage.backend",
                other,
                "expected in_memory or postgres",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Required for the postgres backend
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            database_url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_size: usize,
    pub max_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: crate::core::query::DEFAULT_PAGE_SIZE,
            max_size: crate::core::query::MAX_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    ///
    /// Missing sections and keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Full load: defaults, then the `TICKETS_CONFIG` file if set, then the
    /// process environment
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_yaml_file(path.trim())?,
            _ => Self::default(),
        };
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`, then validate
    ///
    /// Empty values are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = var("TICKETS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("TICKETS_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("server.port", port, "expected a port number"))?;
        }
        if let Some(origins) = var("TICKETS_CORS_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(backend) = var("TICKETS_STORAGE") {
            self.storage.backend = backend.trim().parse()?;
        }
        if let Some(url) = var("DATABASE_URL") {
            self.storage.database_url = Some(url);
        }
        if let Some(level) = var("TICKETS_LOG_LEVEL") {
            self.log_level = level;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pagination;
        if p.max_size == 0 {
            return Err(ConfigError::invalid(
                "pagination.max_size",
                p.max_size.to_string(),
                "must be at least 1",
            ));
        }
        if p.default_size == 0 || p.default_size > p.max_size {
            return Err(ConfigError::invalid(
                "pagination.default_size",
                p.default_size.to_string(),
                format!("must be between 1 and {}", p.max_size),
            ));
        }
        if self.storage.max_connections == 0 {
            return Err(ConfigError::invalid(
                "storage.max_connections",
                "0",
                "must be at least 1",
            ));
        }
        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none()
        {
            return Err(ConfigError::invalid(
                "storage.database_url",
                "",
                "required for the postgres backend",
            ));
        }
        Ok(())
    }

    /// `host:port` to bind the listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
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
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.pagination.default_size, 10);
        assert_eq!(config.pagination.max_size, 100);
        assert_eq!(config.storage.backend, StorageBackend::InMemory);
        assert!(config.cors.allowed_origins.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_keeps_defaults() {
        let config = AppConfig::from_yaml_str(
            "server:\n  port: 9090\ncors:\n  allowed_origins:\n    - http://localhost:5173\n",
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_yaml_serialization() {
        let config = AppConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();

        // Should be able to parse it back
        assert_eq!(AppConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default()
            .with_env_overrides(env(&[
                ("TICKETS_PORT", "3000"),
                ("TICKETS_CORS_ORIGINS", "http://a.test, http://b.test,"),
                ("TICKETS_LOG_LEVEL", "debug"),
                ("TICKETS_HOST", ""),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.cors.allowed_origins,
            vec!["http://a.test", "http://b.test"]
        );
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_port_override() {
        let err = AppConfig::default()
            .with_env_overrides(env(&[("TICKETS_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "server.port"));
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = AppConfig::default()
            .with_env_overrides(env(&[("TICKETS_STORAGE", "postgres")]))
            .unwrap_err();
        assert!(err.to_string().contains("storage.database_url"));

        let ok = AppConfig::default()
            .with_env_overrides(env(&[
                ("TICKETS_STORAGE", "postgres"),
                ("DATABASE_URL", "postgres://localhost/tickets"),
            ]))
            .unwrap();
        assert_eq!(ok.storage.backend, StorageBackend::Postgres);
    }

    #[test]
    fn test_default_size_above_max_is_rejected() {
        let config = AppConfig {
            pagination: PaginationConfig {
                default_size: 50,
                max_size: 20,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
