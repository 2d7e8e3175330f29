//! Configuration for objindex
//!
//! Two layers:
//! - `IndexConfig`: the explicit value handed to `Indexer` / `Remover`.
//!   Carries the target store identity; its absence is a fatal
//!   configuration error raised before any store interaction.
//! - `ServiceConfig`: the JSON file consumed by the binary. The
//!   `FILES_TABLE_NAME` environment binding overrides the file's table name.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;
use crate::index::{IndexError, IndexResult, RetryPolicy};
use crate::model::schema::ENV_TABLE_NAME;

/// Errors loading the service configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Explicit configuration of the consistency core
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Target table; `None` or empty means "not configured"
    #[serde(default)]
    pub table_name: Option<String>,
}

impl IndexConfig {
    pub fn with_table(table_name: impl Into<String>) -> Self {
        Self {
            table_name: Some(table_name.into()),
        }
    }

    /// No target store configured
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Read the table name from `FILES_TABLE_NAME`
    pub fn from_env() -> Self {
        Self {
            table_name: env::var(ENV_TABLE_NAME).ok().filter(|v| !v.is_empty()),
        }
    }

    /// The configured table, or the fatal configuration error
    pub fn require_table(&self) -> IndexResult<&str> {
        match self.table_name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(IndexError::config_missing(ENV_TABLE_NAME)),
        }
    }
}

/// Which index store the binary talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store; state lives as long as the process
    #[default]
    Memory,
    /// Amazon DynamoDB (requires the `dynamodb` feature)
    Dynamodb,
}

/// DynamoDB client settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamoDbConfig {
    /// AWS region (SDK default chain if not specified)
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override (e.g. DynamoDB Local)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Operation timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Target table (optional here; may come from the environment)
    #[serde(default)]
    pub table_name: Option<String>,

    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default)]
    pub dynamodb: DynamoDbConfig,

    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub retry: RetryPolicy,
}

impl ServiceConfig {
    /// Load configuration from file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let mut config = Self::from_json(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Parse and validate a configuration document
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `FILES_TABLE_NAME`, when set and non-empty, wins over the file
    pub fn apply_env(&mut self) {
        if let Some(name) = IndexConfig::from_env().table_name {
            self.table_name = Some(name);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.retry.validate().map_err(ConfigError::Invalid)?;

        if self.http.port == 0 {
            return Err(ConfigError::Invalid("http.port must be > 0".into()));
        }

        if cfg!(not(feature = "dynamodb")) && self.backend == StoreBackend::Dynamodb {
            return Err(ConfigError::Invalid(
                "backend 'dynamodb' requires objindex built with the 'dynamodb' feature".into(),
            ));
        }

        Ok(())
    }

    /// The explicit configuration handed to the index components.
    ///
    /// A missing table is not a load error: each invocation reports it as a
    /// fatal configuration error.
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            table_name: self.table_name.clone().filter(|t| !t.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_require_table() {
        assert_eq!(IndexConfig::with_table("files").require_table().unwrap(), "files");

        let err = IndexConfig::unconfigured().require_table().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.message().contains("FILES_TABLE_NAME"));

        let empty = IndexConfig {
            table_name: Some(String::new()),
        };
        assert!(empty.require_table().is_err());
    }

    #[test]
    fn test_defaults_from_minimal_document() {
        let config = ServiceConfig::from_json("{}").unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.http.port, HttpServerConfig::default().port);
    }

    #[test]
    fn test_invalid_retry_rejected() {
        let err = ServiceConfig::from_json(r#"{ "retry": { "max_attempts": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "table_name": "files", "http": {{ "port": 8080 }}, "retry": {{ "max_attempts": 3 }} }}"#
        )
        .unwrap();

        let config = ServiceConfig::load(file.path()).unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.index_config().table_name.is_some());
    }

    #[test]
    fn test_missing_file() {
        let err = ServiceConfig::load(Path::new("/nonexistent/objindex.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
