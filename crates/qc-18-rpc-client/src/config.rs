//! Client configuration from defaults or environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{ExecuteOptions, TxOptions};

/// Configuration validation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Endpoint is empty or not an http(s) URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// A numeric setting is out of range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Setting name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Logging output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full filter)
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// RPC client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcClientConfig {
    /// JSON-RPC HTTP endpoint
    pub endpoint: String,
    /// Per-request transport timeout. Must cover the execute budget, since
    /// blocking execute is a single request.
    pub request_timeout_secs: u64,
    /// Limit sent when the caller gives none. `None` leaves it to the server.
    pub default_page_size: Option<u64>,
    /// Largest limit the client accepts
    pub max_page_size: u64,
    /// Default budget for blocking execute
    pub execute_timeout_secs: u64,
    /// Poll interval while waiting for the indexer
    pub indexing_poll_interval_ms: u64,
    /// Wait for the indexer by default after blocking execute
    pub wait_for_indexing: bool,
    /// Logging settings
    pub logging: LogConfig,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:6767".to_string(),
            request_timeout_secs: 60,
            default_page_size: None,
            max_page_size: 200,
            execute_timeout_secs: 60,
            indexing_poll_interval_ms: 500,
            wait_for_indexing: false,
            logging: LogConfig::default(),
        }
    }
}

impl RpcClientConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_RPC_ENDPOINT`: Node endpoint (default: http://127.0.0.1:6767)
    /// - `QC_RPC_TIMEOUT_SECS`: Request timeout (default: 60)
    /// - `QC_RPC_DEFAULT_PAGE_SIZE`: Limit used when none is given (default: unset)
    /// - `QC_RPC_MAX_PAGE_SIZE`: Largest accepted limit (default: 200)
    /// - `QC_RPC_EXECUTE_TIMEOUT_SECS`: Blocking execute budget (default: 60)
    /// - `QC_RPC_WAIT_FOR_INDEXING`: Wait for the indexer after execute (default: false)
    /// - `QC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `QC_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            endpoint: env::var("QC_RPC_ENDPOINT").unwrap_or(defaults.endpoint),

            request_timeout_secs: env::var("QC_RPC_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),

            default_page_size: env::var("QC_RPC_DEFAULT_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok()),

            max_page_size: env::var("QC_RPC_MAX_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_page_size),

            execute_timeout_secs: env::var("QC_RPC_EXECUTE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.execute_timeout_secs),

            indexing_poll_interval_ms: defaults.indexing_poll_interval_ms,

            wait_for_indexing: env::var("QC_RPC_WAIT_FOR_INDEXING")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.wait_for_indexing),

            logging: LogConfig {
                log_level: env::var("QC_LOG_LEVEL")
                    .or_else(|_| env::var("RUST_LOG"))
                    .unwrap_or_else(|_| "info".to_string()),
                json_logs: env::var("QC_JSON_LOGS")
                    .map(|v| v.to_lowercase() == "true" || v == "1")
                    .unwrap_or(false),
            },
        }
    }

    /// Short timeouts and small pages for tests.
    pub fn for_testing() -> Self {
        Self {
            endpoint: "http://127.0.0.1:0".to_string(),
            request_timeout_secs: 5,
            default_page_size: None,
            max_page_size: 50,
            execute_timeout_secs: 5,
            indexing_poll_interval_ms: 50,
            wait_for_indexing: false,
            logging: LogConfig {
                log_level: "debug".to_string(),
                json_logs: false,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be positive".into(),
            });
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_page_size",
                reason: "must be positive".into(),
            });
        }
        if let Some(size) = self.default_page_size {
            if size == 0 || size > self.max_page_size {
                return Err(ConfigError::InvalidValue {
                    field: "default_page_size",
                    reason: format!("must be within 1..={}", self.max_page_size),
                });
            }
        }
        if self.execute_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "execute_timeout_secs",
                reason: "must be positive".into(),
            });
        }
        if self.execute_timeout_secs > self.request_timeout_secs {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: format!(
                    "must be at least execute_timeout_secs ({})",
                    self.execute_timeout_secs
                ),
            });
        }
        if self.indexing_poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "indexing_poll_interval_ms",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Execute options derived from this configuration.
    pub fn execute_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            timeout: Duration::from_secs(self.execute_timeout_secs),
            wait_for_indexing: self.wait_for_indexing,
            poll_interval: Duration::from_millis(self.indexing_poll_interval_ms),
            tx_options: TxOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RpcClientConfig::default();
        assert_eq!(config.max_page_size, 200);
        assert_eq!(config.logging.log_level, "info");
        assert!(config.request_timeout() >= config.execute_options().timeout);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config_is_valid() {
        let config = RpcClientConfig::for_testing();
        assert!(config.validate().is_ok());
        assert_eq!(config.execute_options().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validation() {
        let mut config = RpcClientConfig::default();
        config.endpoint = "ftp://node".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpoint(_))
        ));

        let mut config = RpcClientConfig::default();
        config.default_page_size = Some(500);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "default_page_size",
                ..
            })
        ));
    }

    #[test]
    fn test_request_timeout_must_cover_execute_budget() {
        let mut config = RpcClientConfig::default();
        config.request_timeout_secs = 30;
        config.execute_timeout_secs = 60;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                ..
            })
        ));

        config.request_timeout_secs = 60;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: RpcClientConfig =
            serde_json::from_str(r#"{"endpoint": "https://node.example:443"}"#).unwrap();
        assert_eq!(config.endpoint, "https://node.example:443");
        assert_eq!(config.max_page_size, 200);
    }
}
